//! Activity aggregator service

use std::sync::Arc;

use timetrace_domain::{
    Activity, ActivityFilter, NewActivity, Result, TimetraceError,
};
use tracing::debug;
use uuid::Uuid;

use crate::intervals::floor_to_slot;
use crate::time_slot::ports::TimeSlotRepository;

use super::ports::ActivityRepository;

/// Attributes incoming samples to the slot bucket containing their
/// timestamp. Append-only: samples are never merged or rewritten.
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
    time_slots: Arc<dyn TimeSlotRepository>,
}

impl ActivityService {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        time_slots: Arc<dyn TimeSlotRepository>,
    ) -> Self {
        Self { activities, time_slots }
    }

    /// Append samples, each attributed to the slot whose bucket contains
    /// its `recorded_at`. Fails if any sample falls in a bucket with no
    /// stored slot.
    pub async fn record(&self, employee_id: &str, samples: Vec<NewActivity>) -> Result<Vec<Activity>> {
        let mut rows = Vec::with_capacity(samples.len());
        for sample in samples {
            if sample.duration < 0 {
                return Err(TimetraceError::InvalidInput(
                    "activity duration cannot be negative".to_string(),
                ));
            }
            let bucket = floor_to_slot(sample.recorded_at);
            let slot = self
                .time_slots
                .find_by_start(employee_id, bucket)
                .await?
                .ok_or_else(|| {
                    TimetraceError::NotFound(format!("no time slot for bucket {bucket}"))
                })?;
            rows.push(Activity {
                id: Uuid::new_v4().to_string(),
                employee_id: employee_id.to_string(),
                time_slot_id: slot.id,
                title: sample.title,
                duration: sample.duration,
                activity_type: sample.activity_type,
                recorded_at: sample.recorded_at,
                project_id: sample.project_id,
                task_id: sample.task_id,
            });
        }
        self.activities.insert_batch(&rows).await?;
        debug!(employee_id, count = rows.len(), "recorded activity samples");
        Ok(rows)
    }

    pub async fn get_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        self.activities.query(filter).await
    }
}

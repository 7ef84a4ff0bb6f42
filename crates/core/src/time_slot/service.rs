//! Time-slot store service

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use timetrace_domain::constants::{SLOT_INTERVAL_MINUTES, SLOT_INTERVAL_SECONDS};
use timetrace_domain::{
    ReportedTimeSlot, Result, TimeSlot, TimeSlotFilter, TimetraceError,
};
use tracing::debug;
use uuid::Uuid;

use crate::intervals::{delete_bounds, floor_to_slot, generate_time_slots, slot_overlap_seconds};

use super::ports::TimeSlotRepository;

/// Keeps the per-employee bucket grid: one slot per `(employee, bucket)`,
/// with later reports for the same bucket overwriting earlier metrics.
pub struct TimeSlotService {
    repo: Arc<dyn TimeSlotRepository>,
}

impl TimeSlotService {
    pub fn new(repo: Arc<dyn TimeSlotRepository>) -> Self {
        Self { repo }
    }

    /// Store a reported slot, overwriting metrics if the bucket already
    /// exists. The reported start is floored to its bucket boundary, so a
    /// stored slot start is always bucket-aligned.
    pub async fn upsert(&self, employee_id: &str, reported: ReportedTimeSlot) -> Result<TimeSlot> {
        validate_reported(&reported)?;
        let bucket = floor_to_slot(reported.started_at);
        match self.repo.find_by_start(employee_id, bucket).await? {
            Some(mut existing) => {
                existing.duration = reported.duration;
                existing.keyboard = reported.keyboard;
                existing.mouse = reported.mouse;
                existing.overall = reported.overall;
                self.repo.update_metrics(&existing).await?;
                Ok(existing)
            }
            None => {
                let slot = TimeSlot {
                    id: Uuid::new_v4().to_string(),
                    employee_id: employee_id.to_string(),
                    started_at: bucket,
                    duration: reported.duration,
                    keyboard: reported.keyboard,
                    mouse: reported.mouse,
                    overall: reported.overall,
                    created_at: Utc::now(),
                };
                self.repo.insert(&slot).await?;
                Ok(slot)
            }
        }
    }

    /// Store a batch of reported slots, overwriting any buckets that
    /// already exist. Returns the stored slots in input order.
    pub async fn bulk_create_or_update(
        &self,
        employee_id: &str,
        reported: Vec<ReportedTimeSlot>,
    ) -> Result<Vec<TimeSlot>> {
        let mut slots = Vec::with_capacity(reported.len());
        for slot in reported {
            slots.push(self.upsert(employee_id, slot).await?);
        }
        Ok(slots)
    }

    /// Ensure a slot exists for every bucket overlapping `[start, end)`.
    ///
    /// Missing buckets get blank slots whose duration is the seconds of
    /// overlap with the interval; buckets that already exist keep their
    /// metrics untouched. Returns every covering slot, existing or new.
    pub async fn bulk_create(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>> {
        let mut slots = Vec::new();
        for bucket in generate_time_slots(start, end) {
            match self.repo.find_by_start(employee_id, bucket).await? {
                Some(existing) => slots.push(existing),
                None => {
                    let overlap = slot_overlap_seconds(bucket, start, end);
                    let blank = TimeSlot::blank(employee_id, bucket, overlap);
                    self.repo.insert(&blank).await?;
                    slots.push(blank);
                }
            }
        }
        debug!(employee_id, count = slots.len(), "ensured slot coverage");
        Ok(slots)
    }

    /// Remove every slot whose bucket overlaps `[start, end)`, snapping the
    /// bounds outward to bucket boundaries. Returns the rows removed.
    pub async fn range_delete(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let (lo, hi) = delete_bounds(start, end);
        let removed = self.repo.delete_in_range(employee_id, lo, hi).await?;
        debug!(employee_id, removed, "deleted slot range");
        Ok(removed)
    }

    /// Remove the buckets of the old span that the new span no longer
    /// touches. Buckets shared by both spans stay, metrics intact.
    pub async fn delete_conflicting(
        &self,
        employee_id: &str,
        old_start: DateTime<Utc>,
        old_stop: DateTime<Utc>,
        new_start: DateTime<Utc>,
        new_stop: DateTime<Utc>,
    ) -> Result<u64> {
        let kept: Vec<DateTime<Utc>> = generate_time_slots(new_start, new_stop).collect();
        let mut removed = 0;
        for bucket in generate_time_slots(old_start, old_stop) {
            if kept.contains(&bucket) {
                continue;
            }
            let next = bucket + Duration::minutes(SLOT_INTERVAL_MINUTES);
            removed += self.repo.delete_in_range(employee_id, bucket, next).await?;
        }
        debug!(employee_id, removed, "deleted conflicting slots");
        Ok(removed)
    }

    pub async fn get_time_slots(&self, filter: &TimeSlotFilter) -> Result<Vec<TimeSlot>> {
        self.repo.query(filter).await
    }

    pub async fn link_to_time_log(&self, time_log_id: &str, slots: &[TimeSlot]) -> Result<()> {
        let ids: Vec<String> = slots.iter().map(|s| s.id.clone()).collect();
        self.repo.link_to_time_log(time_log_id, &ids).await
    }
}

fn validate_reported(reported: &ReportedTimeSlot) -> Result<()> {
    if reported.duration < 0 || reported.duration > SLOT_INTERVAL_SECONDS {
        return Err(TimetraceError::InvalidInput(format!(
            "slot duration must be between 0 and {SLOT_INTERVAL_SECONDS} seconds"
        )));
    }
    if reported.keyboard < 0 || reported.mouse < 0 || reported.overall < 0 {
        return Err(TimetraceError::InvalidInput(
            "slot metrics cannot be negative".to_string(),
        ));
    }
    Ok(())
}

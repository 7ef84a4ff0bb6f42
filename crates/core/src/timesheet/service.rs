//! Timesheet aggregator service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use timetrace_domain::{Result, Timesheet, TimesheetFilter, TimesheetStatus, TimetraceError};
use tracing::debug;

use crate::intervals::week_bounds;
use crate::time_slot::ports::TimeSlotRepository;

use super::ports::TimesheetRepository;

/// Maintains the weekly rollups. Aggregates are always recomputed from the
/// full set of slots in the week, never adjusted incrementally, so a
/// recalculation after any slot mutation converges to the same numbers.
pub struct TimesheetService {
    timesheets: Arc<dyn TimesheetRepository>,
    time_slots: Arc<dyn TimeSlotRepository>,
}

impl TimesheetService {
    pub fn new(
        timesheets: Arc<dyn TimesheetRepository>,
        time_slots: Arc<dyn TimeSlotRepository>,
    ) -> Self {
        Self { timesheets, time_slots }
    }

    /// Return the employee's timesheet for the week containing `at`,
    /// creating a blank one if the week has none yet.
    pub async fn first_or_create(&self, employee_id: &str, at: DateTime<Utc>) -> Result<Timesheet> {
        let (week_start, week_stop) = week_bounds(at);
        if let Some(existing) = self.timesheets.find_by_week(employee_id, week_start).await? {
            return Ok(existing);
        }
        let timesheet = Timesheet::blank(employee_id, week_start, week_stop);
        self.timesheets.insert(&timesheet).await?;
        debug!(employee_id, %week_start, "created timesheet");
        Ok(timesheet)
    }

    /// Recompute duration and metric averages from the slots currently in
    /// the timesheet's week.
    pub async fn recalculate(&self, timesheet_id: &str) -> Result<Timesheet> {
        let mut timesheet = self
            .timesheets
            .find_by_id(timesheet_id)
            .await?
            .ok_or_else(|| TimetraceError::NotFound(format!("timesheet {timesheet_id}")))?;

        let slots = self
            .time_slots
            .find_in_range(&timesheet.employee_id, timesheet.started_at, timesheet.stopped_at)
            .await?;

        if slots.is_empty() {
            timesheet.duration = 0;
            timesheet.keyboard = 0;
            timesheet.mouse = 0;
            timesheet.overall = 0;
        } else {
            let count = slots.len() as i64;
            timesheet.duration = slots.iter().map(|s| s.duration).sum();
            timesheet.keyboard = average(slots.iter().map(|s| s.keyboard).sum(), count);
            timesheet.mouse = average(slots.iter().map(|s| s.mouse).sum(), count);
            timesheet.overall = average(slots.iter().map(|s| s.overall).sum(), count);
        }

        self.timesheets.update_aggregates(&timesheet).await?;
        debug!(
            timesheet_id,
            duration = timesheet.duration,
            slots = slots.len(),
            "recalculated timesheet"
        );
        Ok(timesheet)
    }

    pub async fn get_timesheets(&self, filter: &TimesheetFilter) -> Result<Vec<Timesheet>> {
        self.timesheets.query(filter).await
    }

    /// Set the status of each timesheet. Approving stamps the approver and
    /// approval time; any other transition clears them.
    pub async fn update_status(
        &self,
        ids: &[String],
        status: TimesheetStatus,
        approved_by_id: Option<&str>,
    ) -> Result<Vec<Timesheet>> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let mut timesheet = self
                .timesheets
                .find_by_id(id)
                .await?
                .ok_or_else(|| TimetraceError::NotFound(format!("timesheet {id}")))?;
            timesheet.status = status;
            if status == TimesheetStatus::Approved {
                timesheet.approved_by_id = approved_by_id.map(str::to_string);
                timesheet.approved_at = Some(Utc::now());
            } else {
                timesheet.approved_by_id = None;
                timesheet.approved_at = None;
            }
            self.timesheets.save_status(&timesheet).await?;
            updated.push(timesheet);
        }
        Ok(updated)
    }

    /// Mark timesheets as submitted, stamping the submission time.
    pub async fn submit(&self, ids: &[String]) -> Result<Vec<Timesheet>> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let mut timesheet = self
                .timesheets
                .find_by_id(id)
                .await?
                .ok_or_else(|| TimetraceError::NotFound(format!("timesheet {id}")))?;
            timesheet.status = TimesheetStatus::Submitted;
            timesheet.submitted_at = Some(Utc::now());
            self.timesheets.save_status(&timesheet).await?;
            updated.push(timesheet);
        }
        Ok(updated)
    }
}

fn average(total: i64, count: i64) -> i64 {
    // round half up
    (total + count / 2) / count
}

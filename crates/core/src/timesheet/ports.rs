//! Port interfaces for timesheet persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use timetrace_domain::{Result, Timesheet, TimesheetFilter};

#[async_trait]
pub trait TimesheetRepository: Send + Sync {
    async fn insert(&self, timesheet: &Timesheet) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Timesheet>>;

    /// Look up the employee's timesheet for the week starting at
    /// `week_start` (Monday 00:00 UTC).
    async fn find_by_week(
        &self,
        employee_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Option<Timesheet>>;

    /// Persist recomputed duration and metric averages.
    async fn update_aggregates(&self, timesheet: &Timesheet) -> Result<()>;

    /// Persist status, submission and approval fields.
    async fn save_status(&self, timesheet: &Timesheet) -> Result<()>;

    async fn query(&self, filter: &TimesheetFilter) -> Result<Vec<Timesheet>>;
}

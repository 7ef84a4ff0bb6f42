//! Timesheet model - one weekly rollup per employee

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approval workflow state.
///
/// Transitions are plain status writes; the core does not enforce a state
/// machine beyond what the caller sends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimesheetStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Weekly aggregate and approval record for one employee.
///
/// `started_at`/`stopped_at` are calendar-week boundaries (Monday 00:00 UTC,
/// half-open one week later). Aggregates are always a full recompute over the
/// week's time slots, never patched incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timesheet {
    pub id: String,
    pub employee_id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    /// Sum of slot durations in seconds
    pub duration: i64,
    /// Rounded average keyboard activity across the week's slots
    pub keyboard: i64,
    pub mouse: i64,
    pub overall: i64,
    pub status: TimesheetStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by_id: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Timesheet {
    /// Build an empty Pending timesheet covering `[week_start, week_start+7d)`.
    pub fn blank(employee_id: &str, week_start: DateTime<Utc>, week_stop: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            started_at: week_start,
            stopped_at: week_stop,
            duration: 0,
            keyboard: 0,
            mouse: 0,
            overall: 0,
            status: TimesheetStatus::Pending,
            submitted_at: None,
            approved_by_id: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }
}

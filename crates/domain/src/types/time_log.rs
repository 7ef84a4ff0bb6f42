//! Time log model - continuous tracked or manual work intervals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a log entry came to exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeLogType {
    Manual,
    Tracked,
}

impl TimeLogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Tracked => "TRACKED",
        }
    }
}

/// Which tracker surface reported the interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeLogSource {
    Desktop,
    Web,
    Mobile,
    Browser,
}

impl TimeLogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "DESKTOP",
            Self::Web => "WEB",
            Self::Mobile => "MOBILE",
            Self::Browser => "BROWSER",
        }
    }
}

/// One continuous work interval belonging to exactly one weekly timesheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: String,
    pub employee_id: String,
    pub timesheet_id: String,
    pub started_at: DateTime<Utc>,
    /// Strictly after `started_at`
    pub stopped_at: DateTime<Utc>,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub organization_contact_id: Option<String>,
    pub log_type: TimeLogType,
    pub source: TimeLogSource,
    pub description: Option<String>,
    pub is_billable: bool,
    /// Soft-delete marker; hard deletes remove the row entirely
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TimeLog {
    /// Interval length in seconds.
    pub fn duration(&self) -> i64 {
        (self.stopped_at - self.started_at).num_seconds()
    }
}

/// Input for creating a new interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimeLog {
    pub employee_id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub organization_contact_id: Option<String>,
    pub log_type: TimeLogType,
    pub source: TimeLogSource,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_billable: bool,
    /// Per-bucket metrics reported by the tracker, if any
    #[serde(default)]
    pub time_slots: Vec<super::time_slot::ReportedTimeSlot>,
}

/// Partial update for an existing interval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimeLog {
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub organization_contact_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_billable: Option<bool>,
}

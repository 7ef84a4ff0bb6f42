//! Query filters for the read paths

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::ActivityType;
use super::time_log::{TimeLogSource, TimeLogType};

/// Inclusive activity-level bounds in percent (0-100) of a full bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivityLevel {
    pub start: i64,
    pub end: i64,
}

/// Filter for listing time slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSlotFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub employee_ids: Vec<String>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    /// Restrict to slots covered by logs from these sources
    #[serde(default)]
    pub source: Vec<TimeLogSource>,
    /// Restrict to slots covered by logs of these types
    #[serde(default)]
    pub log_type: Vec<TimeLogType>,
}

/// Filter for listing time logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeLogFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub employee_ids: Vec<String>,
    #[serde(default)]
    pub project_ids: Vec<String>,
    #[serde(default)]
    pub source: Vec<TimeLogSource>,
    #[serde(default)]
    pub log_type: Vec<TimeLogType>,
    /// Include soft-deleted logs in the result
    #[serde(default)]
    pub include_deleted: bool,
}

/// Filter for listing timesheets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimesheetFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub employee_ids: Vec<String>,
}

/// Filter for listing activity samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub employee_ids: Vec<String>,
    #[serde(default)]
    pub activity_type: Option<ActivityType>,
    /// Inclusive duration bounds in seconds
    #[serde(default)]
    pub min_duration: Option<i64>,
    #[serde(default)]
    pub max_duration: Option<i64>,
    #[serde(default)]
    pub project_ids: Vec<String>,
}

//! Time slot model - fixed 10-minute activity buckets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One fixed 10-minute bucket of device activity for one employee.
///
/// `started_at` is always truncated to a whole minute and aligned to a
/// 10-minute boundary. A bucket is unique per (employee_id, started_at);
/// repeated tracker reports merge into the existing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub employee_id: String,
    pub started_at: DateTime<Utc>,
    /// Seconds of tracked work inside this bucket
    pub duration: i64,
    /// Keyboard activity measure (seconds of the bucket with keystrokes)
    pub keyboard: i64,
    /// Mouse activity measure
    pub mouse: i64,
    /// Overall activity measure
    pub overall: i64,
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    /// Build a bucket with zeroed metrics at the given aligned start.
    pub fn blank(employee_id: &str, started_at: DateTime<Utc>, duration: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            started_at,
            duration,
            keyboard: 0,
            mouse: 0,
            overall: 0,
            created_at: Utc::now(),
        }
    }
}

/// Per-bucket metrics reported by a tracker alongside an interval.
///
/// Matched to stored buckets by flooring `started_at` to its 10-minute
/// boundary; buckets the tracker did not report stay blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedTimeSlot {
    pub started_at: DateTime<Utc>,
    pub duration: i64,
    pub keyboard: i64,
    pub mouse: i64,
    pub overall: i64,
}

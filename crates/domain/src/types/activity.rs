//! Activity model - named work samples attributed to a time slot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of thing the sample names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    App,
    Url,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "APP",
            Self::Url => "URL",
        }
    }
}

/// A named activity sample (app or visited site) attributed to the time slot
/// whose bucket contains its timestamp. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub employee_id: String,
    pub time_slot_id: String,
    pub title: String,
    /// Seconds spent on this activity
    pub duration: i64,
    pub activity_type: ActivityType,
    pub recorded_at: DateTime<Utc>,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
}

/// Input for appending an activity sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub employee_id: String,
    pub title: String,
    pub duration: i64,
    pub activity_type: ActivityType,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
}

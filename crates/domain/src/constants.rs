//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Time bucketing
pub const SLOT_INTERVAL_MINUTES: i64 = 10;
pub const SLOT_INTERVAL_SECONDS: i64 = SLOT_INTERVAL_MINUTES * 60;

// Timesheet aggregation
pub const DAYS_PER_WEEK: i64 = 7;

/// Divisor mapping an activity-level percentage to seconds of a full slot
/// (100% of a 600-second bucket == 600, so 1% == 6 seconds).
pub const ACTIVITY_PERCENT_TO_SECONDS: i64 = SLOT_INTERVAL_SECONDS / 100;

// Database defaults
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

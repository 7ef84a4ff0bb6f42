//! Domain types and models

pub mod activity;
pub mod filters;
pub mod time_log;
pub mod time_slot;
pub mod timesheet;

pub use activity::{Activity, ActivityType, NewActivity};
pub use filters::{ActivityFilter, ActivityLevel, TimeLogFilter, TimeSlotFilter, TimesheetFilter};
pub use time_log::{NewTimeLog, TimeLog, TimeLogSource, TimeLogType, UpdateTimeLog};
pub use time_slot::{ReportedTimeSlot, TimeSlot};
pub use timesheet::{Timesheet, TimesheetStatus};

//! # Timetrace Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Bucket-interval math (the single source of truth for slot alignment)
//! - Port/adapter interfaces (traits)
//! - The time-slot store, interval manager, timesheet aggregator and
//!   activity aggregator services
//!
//! ## Architecture Principles
//! - Only depends on `timetrace-domain`
//! - No database or transport code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod activity;
pub mod employee_lock;
pub mod intervals;
pub mod time_log;
pub mod time_slot;
pub mod timesheet;

// Re-export specific items to avoid ambiguity
pub use activity::ports::ActivityRepository;
pub use activity::ActivityService;
pub use employee_lock::EmployeeLockRegistry;
pub use intervals::{delete_bounds, floor_to_slot, generate_time_slots, week_bounds};
pub use time_log::ports::TimeLogRepository;
pub use time_log::TimeLogService;
pub use time_slot::ports::TimeSlotRepository;
pub use time_slot::TimeSlotService;
pub use timesheet::ports::TimesheetRepository;
pub use timesheet::TimesheetService;

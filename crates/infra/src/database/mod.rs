//! Database implementations

pub mod activity_repository;
pub mod manager;
pub mod time_log_repository;
pub mod time_slot_repository;
pub mod timesheet_repository;

pub use activity_repository::*;
pub use manager::*;
pub use time_log_repository::*;
pub use time_slot_repository::*;
pub use timesheet_repository::*;

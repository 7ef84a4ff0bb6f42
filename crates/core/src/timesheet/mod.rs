//! Timesheet aggregator
//!
//! One timesheet per employee per calendar week, with aggregates recomputed
//! from the slots the week contains.

pub mod ports;
pub mod service;

pub use service::TimesheetService;

//! Time-log interval manager
//!
//! Work intervals and the time-span edit/delete algorithm that keeps them
//! consistent with the slot grid and the weekly timesheets.

pub mod ports;
pub mod service;

pub use service::TimeLogService;

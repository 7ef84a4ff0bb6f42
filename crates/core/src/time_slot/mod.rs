//! Time-slot store
//!
//! Ten-minute activity buckets keyed by `(employee, bucket start)`.

pub mod ports;
pub mod service;

pub use service::TimeSlotService;

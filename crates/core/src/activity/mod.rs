//! Activity aggregator
//!
//! Named work samples (apps, visited sites) attributed to slot buckets.

pub mod ports;
pub mod service;

pub use service::ActivityService;

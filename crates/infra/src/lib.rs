//! # Timetrace Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite-backed repository implementations
//! - The connection pool and schema migrations
//! - Configuration loading (environment, JSON/TOML files)
//!
//! ## Architecture
//! - Implements traits defined in `timetrace-core`
//! - Contains all "impure" code (I/O, database access)

pub mod config;
pub mod database;
pub mod errors;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;

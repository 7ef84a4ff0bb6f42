//! Configuration structures
//!
//! Plain data definitions; loading lives in the infra crate.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DB_POOL_SIZE;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter directive, e.g. `info` or `timetrace_core=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

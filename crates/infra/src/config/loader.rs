//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TIMETRACE_DB_PATH`: Database file path (required)
//! - `TIMETRACE_DB_POOL_SIZE`: Connection pool size (optional)
//! - `TIMETRACE_LOG_LEVEL`: Log filter directive (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml`
//! 2. `./timetrace.json` or `./timetrace.toml`
//! 3. The same names in the parent directory

use std::path::PathBuf;

use timetrace_domain::constants::DEFAULT_DB_POOL_SIZE;
use timetrace_domain::{Config, DatabaseConfig, LoggingConfig, Result, TimetraceError};

/// Load configuration with automatic fallback strategy.
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `TimetraceError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables.
///
/// `TIMETRACE_DB_PATH` must be present; pool size and log level fall back
/// to their defaults when unset.
pub fn load_from_env() -> Result<Config> {
    let path = env_var("TIMETRACE_DB_PATH")?;
    let pool_size = match std::env::var("TIMETRACE_DB_POOL_SIZE") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| TimetraceError::Config(format!("Invalid pool size: {e}")))?,
        Err(_) => DEFAULT_DB_POOL_SIZE,
    };
    let level = std::env::var("TIMETRACE_LOG_LEVEL")
        .unwrap_or_else(|_| LoggingConfig::default().level);

    Ok(Config {
        database: DatabaseConfig { path, pool_size },
        logging: LoggingConfig { level },
    })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations. Formats are detected
/// by file extension; JSON and TOML are supported.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TimetraceError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TimetraceError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        TimetraceError::Config(format!("Failed to read {}: {e}", config_path.display()))
    })?;

    let config = match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .map_err(|e| TimetraceError::Config(format!("Invalid JSON config: {e}")))?,
        Some("toml") => toml::from_str(&contents)
            .map_err(|e| TimetraceError::Config(format!("Invalid TOML config: {e}")))?,
        other => {
            return Err(TimetraceError::Config(format!(
                "Unsupported config format: {other:?}"
            )))
        }
    };

    tracing::info!(path = %config_path.display(), "Configuration loaded from file");
    Ok(config)
}

fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.json", "config.toml", "timetrace.json", "timetrace.toml"];
    for dir in [".", ".."] {
        for name in NAMES {
            let candidate = PathBuf::from(dir).join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| TimetraceError::Config(format!("Missing environment variable: {name}")))
}

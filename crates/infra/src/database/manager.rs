//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use timetrace_domain::{Result, TimetraceError};
use tracing::info;

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Shared connection handle used by the repositories.
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database manager that wraps an r2d2 connection pool.
pub struct DbManager {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();

        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
        });

        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(map_pool_error)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            "sqlite pool initialised"
        );

        Ok(Self { pool, path })
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<DbConnection> {
        self.pool.get().map_err(map_pool_error)
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)?;
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(map_sql_error)?;
        Ok(())
    }
}

fn create_schema(conn: &DbConnection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> TimetraceError {
    TimetraceError::from(InfraError::from(err))
}

fn map_pool_error(err: r2d2::Error) -> TimetraceError {
    TimetraceError::from(InfraError::from(err))
}

/// Map a `spawn_blocking` join failure into a domain error.
pub(crate) fn map_join_error(err: tokio::task::JoinError) -> TimetraceError {
    TimetraceError::Internal(format!("blocking task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn migrations_create_schema_version() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("manager created");
        manager.run_migrations().expect("migrations run");

        let conn = manager.get_connection().expect("connection acquired");
        let version: i32 =
            conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_idempotent() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("manager created");
        manager.run_migrations().expect("first run");
        manager.run_migrations().expect("second run");
    }

    #[test]
    fn health_check_succeeds_for_valid_database() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("manager created");
        manager.run_migrations().expect("migrations run");

        manager.health_check().expect("health check passed");
    }
}

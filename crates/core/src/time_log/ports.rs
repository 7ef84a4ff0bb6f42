//! Port interfaces for time-log persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use timetrace_domain::{Result, TimeLog, TimeLogFilter};

#[async_trait]
pub trait TimeLogRepository: Send + Sync {
    async fn insert(&self, log: &TimeLog) -> Result<()>;

    /// Fetch by id, including soft-deleted rows.
    async fn find_by_id(&self, id: &str) -> Result<Option<TimeLog>>;

    /// Overwrite the mutable columns of an existing log.
    async fn update(&self, log: &TimeLog) -> Result<()>;

    /// Mark the log deleted without removing the row.
    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Remove the row entirely.
    async fn hard_delete(&self, id: &str) -> Result<()>;

    async fn query(&self, filter: &TimeLogFilter) -> Result<Vec<TimeLog>>;
}

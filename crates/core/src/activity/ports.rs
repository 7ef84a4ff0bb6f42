//! Port interfaces for activity persistence

use async_trait::async_trait;
use timetrace_domain::{Activity, ActivityFilter, Result};

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Append a batch of samples. Activities are never updated in place.
    async fn insert_batch(&self, activities: &[Activity]) -> Result<()>;

    async fn query(&self, filter: &ActivityFilter) -> Result<Vec<Activity>>;
}

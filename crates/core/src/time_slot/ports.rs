//! Port interfaces for time-slot persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use timetrace_domain::{Result, TimeSlot, TimeSlotFilter};

/// Persistence port for time slots.
///
/// Range arguments are half-open: `[start, end)`.
#[async_trait]
pub trait TimeSlotRepository: Send + Sync {
    async fn insert(&self, slot: &TimeSlot) -> Result<()>;

    /// Overwrite the metrics and duration of an existing slot.
    async fn update_metrics(&self, slot: &TimeSlot) -> Result<()>;

    async fn find_by_start(
        &self,
        employee_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<Option<TimeSlot>>;

    async fn find_in_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>>;

    /// Delete every slot of the employee starting in `[start, end)`.
    /// Returns the number of rows removed.
    async fn delete_in_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64>;

    async fn query(&self, filter: &TimeSlotFilter) -> Result<Vec<TimeSlot>>;

    /// Associate slots with a time log (idempotent).
    async fn link_to_time_log(&self, time_log_id: &str, slot_ids: &[String]) -> Result<()>;
}

//! SQLite-backed time-slot repository.
//!
//! Implements the async `TimeSlotRepository` port on top of the shared
//! connection pool. All statements run on the blocking thread pool.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row, ToSql};
use timetrace_core::TimeSlotRepository as TimeSlotRepositoryPort;
use timetrace_domain::constants::ACTIVITY_PERCENT_TO_SECONDS;
use timetrace_domain::{Result, TimeSlot, TimeSlotFilter};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbConnection, DbManager};

pub struct SqliteTimeSlotRepository {
    db: Arc<DbManager>,
}

impl SqliteTimeSlotRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimeSlotRepositoryPort for SqliteTimeSlotRepository {
    async fn insert(&self, slot: &TimeSlot) -> Result<()> {
        let db = Arc::clone(&self.db);
        let slot = slot.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                SLOT_INSERT_SQL,
                params![
                    slot.id,
                    slot.employee_id,
                    slot.started_at.timestamp(),
                    slot.duration,
                    slot.keyboard,
                    slot.mouse,
                    slot.overall,
                    slot.created_at.timestamp(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_metrics(&self, slot: &TimeSlot) -> Result<()> {
        let db = Arc::clone(&self.db);
        let slot = slot.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                SLOT_UPDATE_METRICS_SQL,
                params![slot.id, slot.duration, slot.keyboard, slot.mouse, slot.overall],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_start(
        &self,
        employee_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<Option<TimeSlot>> {
        let db = Arc::clone(&self.db);
        let employee_id = employee_id.to_string();
        task::spawn_blocking(move || -> Result<Option<TimeSlot>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(SLOT_BY_START_QUERY).map_err(map_sql_error)?;
            let mut rows = stmt
                .query_map(params![employee_id, started_at.timestamp()], map_slot_row)
                .map_err(map_sql_error)?;
            rows.next().transpose().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_in_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>> {
        let db = Arc::clone(&self.db);
        let employee_id = employee_id.to_string();
        task::spawn_blocking(move || -> Result<Vec<TimeSlot>> {
            let conn = db.get_connection()?;
            query_slots(
                &conn,
                SLOT_IN_RANGE_QUERY,
                params![employee_id, start.timestamp(), end.timestamp()],
            )
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_in_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let db = Arc::clone(&self.db);
        let employee_id = employee_id.to_string();
        task::spawn_blocking(move || -> Result<u64> {
            let conn = db.get_connection()?;
            let removed = conn
                .execute(
                    SLOT_DELETE_RANGE_SQL,
                    params![employee_id, start.timestamp(), end.timestamp()],
                )
                .map_err(map_sql_error)?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn query(&self, filter: &TimeSlotFilter) -> Result<Vec<TimeSlot>> {
        let db = Arc::clone(&self.db);
        let (sql, params) = build_slot_query(filter);
        task::spawn_blocking(move || -> Result<Vec<TimeSlot>> {
            let conn = db.get_connection()?;
            let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
            query_slots(&conn, &sql, refs.as_slice())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn link_to_time_log(&self, time_log_id: &str, slot_ids: &[String]) -> Result<()> {
        let db = Arc::clone(&self.db);
        let time_log_id = time_log_id.to_string();
        let slot_ids = slot_ids.to_vec();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(LINK_INSERT_SQL).map_err(map_sql_error)?;
            for slot_id in &slot_ids {
                stmt.execute(params![time_log_id, slot_id]).map_err(map_sql_error)?;
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

const SLOT_COLUMNS: &str =
    "id, employee_id, started_at, duration, keyboard, mouse, overall, created_at";

const SLOT_INSERT_SQL: &str = "INSERT INTO time_slots (
    id, employee_id, started_at, duration, keyboard, mouse, overall, created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SLOT_UPDATE_METRICS_SQL: &str =
    "UPDATE time_slots SET duration = ?2, keyboard = ?3, mouse = ?4, overall = ?5 WHERE id = ?1";

const SLOT_BY_START_QUERY: &str = "SELECT id, employee_id, started_at, duration, keyboard, \
     mouse, overall, created_at FROM time_slots WHERE employee_id = ?1 AND started_at = ?2";

const SLOT_IN_RANGE_QUERY: &str = "SELECT id, employee_id, started_at, duration, keyboard, \
     mouse, overall, created_at FROM time_slots \
     WHERE employee_id = ?1 AND started_at >= ?2 AND started_at < ?3 ORDER BY started_at";

const SLOT_DELETE_RANGE_SQL: &str =
    "DELETE FROM time_slots WHERE employee_id = ?1 AND started_at >= ?2 AND started_at < ?3";

const LINK_INSERT_SQL: &str =
    "INSERT OR IGNORE INTO time_log_time_slots (time_log_id, time_slot_id) VALUES (?1, ?2)";

fn query_slots<P: rusqlite::Params>(
    conn: &DbConnection,
    sql: &str,
    params: P,
) -> Result<Vec<TimeSlot>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt.query_map(params, map_slot_row).map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
}

fn map_slot_row(row: &Row<'_>) -> rusqlite::Result<TimeSlot> {
    Ok(TimeSlot {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        started_at: datetime_column(row, 2)?,
        duration: row.get(3)?,
        keyboard: row.get(4)?,
        mouse: row.get(5)?,
        overall: row.get(6)?,
        created_at: datetime_column(row, 7)?,
    })
}

pub(crate) fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {secs}").into(),
        )
    })
}

pub(crate) fn optional_datetime_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(secs) => DateTime::from_timestamp(secs, 0).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Integer,
                format!("timestamp out of range: {secs}").into(),
            )
        }),
        None => Ok(None),
    }
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn build_slot_query(filter: &TimeSlotFilter) -> (String, Vec<Box<dyn ToSql + Send>>) {
    let mut sql = format!("SELECT {SLOT_COLUMNS} FROM time_slots WHERE 1=1");
    let mut params: Vec<Box<dyn ToSql + Send>> = Vec::new();

    if let Some(start) = filter.start_date {
        sql.push_str(" AND started_at >= ?");
        params.push(Box::new(start.timestamp()));
    }
    if let Some(end) = filter.end_date {
        sql.push_str(" AND started_at < ?");
        params.push(Box::new(end.timestamp()));
    }
    if !filter.employee_ids.is_empty() {
        sql.push_str(&format!(
            " AND employee_id IN ({})",
            placeholders(filter.employee_ids.len())
        ));
        for id in &filter.employee_ids {
            params.push(Box::new(id.clone()));
        }
    }
    if let Some(level) = filter.activity_level {
        // Levels are percentages of a full bucket; metrics are seconds.
        sql.push_str(" AND overall BETWEEN ? AND ?");
        params.push(Box::new(level.start * ACTIVITY_PERCENT_TO_SECONDS));
        params.push(Box::new(level.end * ACTIVITY_PERCENT_TO_SECONDS));
    }
    if !filter.source.is_empty() {
        sql.push_str(&format!(
            " AND id IN (SELECT tls.time_slot_id FROM time_log_time_slots tls \
             JOIN time_logs tl ON tl.id = tls.time_log_id WHERE tl.source IN ({}))",
            placeholders(filter.source.len())
        ));
        for source in &filter.source {
            params.push(Box::new(source.as_str()));
        }
    }
    if !filter.log_type.is_empty() {
        sql.push_str(&format!(
            " AND id IN (SELECT tls.time_slot_id FROM time_log_time_slots tls \
             JOIN time_logs tl ON tl.id = tls.time_log_id WHERE tl.log_type IN ({}))",
            placeholders(filter.log_type.len())
        ));
        for log_type in &filter.log_type {
            params.push(Box::new(log_type.as_str()));
        }
    }

    sql.push_str(" ORDER BY started_at");
    (sql, params)
}

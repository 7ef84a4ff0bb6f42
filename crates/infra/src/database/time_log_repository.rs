//! SQLite-backed time-log repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row, ToSql};
use timetrace_core::TimeLogRepository as TimeLogRepositoryPort;
use timetrace_domain::{Result, TimeLog, TimeLogFilter, TimeLogSource, TimeLogType};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::time_slot_repository::{datetime_column, optional_datetime_column, placeholders};

pub struct SqliteTimeLogRepository {
    db: Arc<DbManager>,
}

impl SqliteTimeLogRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimeLogRepositoryPort for SqliteTimeLogRepository {
    async fn insert(&self, log: &TimeLog) -> Result<()> {
        let db = Arc::clone(&self.db);
        let log = log.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                LOG_INSERT_SQL,
                params![
                    log.id,
                    log.employee_id,
                    log.timesheet_id,
                    log.started_at.timestamp(),
                    log.stopped_at.timestamp(),
                    log.project_id,
                    log.task_id,
                    log.organization_contact_id,
                    log.log_type.as_str(),
                    log.source.as_str(),
                    log.description,
                    log.is_billable,
                    log.deleted_at.map(|d| d.timestamp()),
                    log.created_at.timestamp(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TimeLog>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<Option<TimeLog>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(LOG_BY_ID_QUERY).map_err(map_sql_error)?;
            let mut rows = stmt.query_map(params![id], map_log_row).map_err(map_sql_error)?;
            rows.next().transpose().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update(&self, log: &TimeLog) -> Result<()> {
        let db = Arc::clone(&self.db);
        let log = log.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                LOG_UPDATE_SQL,
                params![
                    log.id,
                    log.timesheet_id,
                    log.started_at.timestamp(),
                    log.stopped_at.timestamp(),
                    log.project_id,
                    log.task_id,
                    log.organization_contact_id,
                    log.description,
                    log.is_billable,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(LOG_SOFT_DELETE_SQL, params![id, at.timestamp()])
                .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn hard_delete(&self, id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(LOG_HARD_DELETE_SQL, params![id]).map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn query(&self, filter: &TimeLogFilter) -> Result<Vec<TimeLog>> {
        let db = Arc::clone(&self.db);
        let (sql, params) = build_log_query(filter);
        task::spawn_blocking(move || -> Result<Vec<TimeLog>> {
            let conn = db.get_connection()?;
            let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt.query_map(refs.as_slice(), map_log_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const LOG_COLUMNS: &str = "id, employee_id, timesheet_id, started_at, stopped_at, project_id, \
     task_id, organization_contact_id, log_type, source, description, is_billable, deleted_at, \
     created_at";

const LOG_INSERT_SQL: &str = "INSERT INTO time_logs (
    id, employee_id, timesheet_id, started_at, stopped_at, project_id, task_id,
    organization_contact_id, log_type, source, description, is_billable, deleted_at, created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";

const LOG_BY_ID_QUERY: &str = "SELECT id, employee_id, timesheet_id, started_at, stopped_at, \
     project_id, task_id, organization_contact_id, log_type, source, description, is_billable, \
     deleted_at, created_at FROM time_logs WHERE id = ?1";

const LOG_UPDATE_SQL: &str = "UPDATE time_logs SET timesheet_id = ?2, started_at = ?3, \
     stopped_at = ?4, project_id = ?5, task_id = ?6, organization_contact_id = ?7, \
     description = ?8, is_billable = ?9 WHERE id = ?1";

const LOG_SOFT_DELETE_SQL: &str = "UPDATE time_logs SET deleted_at = ?2 WHERE id = ?1";

const LOG_HARD_DELETE_SQL: &str = "DELETE FROM time_logs WHERE id = ?1";

fn map_log_row(row: &Row<'_>) -> rusqlite::Result<TimeLog> {
    Ok(TimeLog {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        timesheet_id: row.get(2)?,
        started_at: datetime_column(row, 3)?,
        stopped_at: datetime_column(row, 4)?,
        project_id: row.get(5)?,
        task_id: row.get(6)?,
        organization_contact_id: row.get(7)?,
        log_type: parse_log_type(row, 8)?,
        source: parse_source(row, 9)?,
        description: row.get(10)?,
        is_billable: row.get(11)?,
        deleted_at: optional_datetime_column(row, 12)?,
        created_at: datetime_column(row, 13)?,
    })
}

fn parse_log_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<TimeLogType> {
    let raw: String = row.get(idx)?;
    match raw.as_str() {
        "MANUAL" => Ok(TimeLogType::Manual),
        "TRACKED" => Ok(TimeLogType::Tracked),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown log type: {other}").into(),
        )),
    }
}

fn parse_source(row: &Row<'_>, idx: usize) -> rusqlite::Result<TimeLogSource> {
    let raw: String = row.get(idx)?;
    match raw.as_str() {
        "DESKTOP" => Ok(TimeLogSource::Desktop),
        "WEB" => Ok(TimeLogSource::Web),
        "MOBILE" => Ok(TimeLogSource::Mobile),
        "BROWSER" => Ok(TimeLogSource::Browser),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown source: {other}").into(),
        )),
    }
}

fn build_log_query(filter: &TimeLogFilter) -> (String, Vec<Box<dyn ToSql + Send>>) {
    let mut sql = format!("SELECT {LOG_COLUMNS} FROM time_logs WHERE 1=1");
    let mut params: Vec<Box<dyn ToSql + Send>> = Vec::new();

    if !filter.include_deleted {
        sql.push_str(" AND deleted_at IS NULL");
    }
    // Range filters match any log overlapping the window.
    if let Some(start) = filter.start_date {
        sql.push_str(" AND stopped_at > ?");
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
    if !filter.project_ids.is_empty() {
        sql.push_str(&format!(" AND project_id IN ({})", placeholders(filter.project_ids.len())));
        for id in &filter.project_ids {
            params.push(Box::new(id.clone()));
        }
    }
    if !filter.source.is_empty() {
        sql.push_str(&format!(" AND source IN ({})", placeholders(filter.source.len())));
        for source in &filter.source {
            params.push(Box::new(source.as_str()));
        }
    }
    if !filter.log_type.is_empty() {
        sql.push_str(&format!(" AND log_type IN ({})", placeholders(filter.log_type.len())));
        for log_type in &filter.log_type {
            params.push(Box::new(log_type.as_str()));
        }
    }

    sql.push_str(" ORDER BY started_at");
    (sql, params)
}

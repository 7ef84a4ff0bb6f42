//! SQLite-backed timesheet repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row, ToSql};
use timetrace_core::TimesheetRepository as TimesheetRepositoryPort;
use timetrace_domain::{Result, Timesheet, TimesheetFilter, TimesheetStatus};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::time_slot_repository::{datetime_column, optional_datetime_column, placeholders};

pub struct SqliteTimesheetRepository {
    db: Arc<DbManager>,
}

impl SqliteTimesheetRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimesheetRepositoryPort for SqliteTimesheetRepository {
    async fn insert(&self, timesheet: &Timesheet) -> Result<()> {
        let db = Arc::clone(&self.db);
        let sheet = timesheet.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                SHEET_INSERT_SQL,
                params![
                    sheet.id,
                    sheet.employee_id,
                    sheet.started_at.timestamp(),
                    sheet.stopped_at.timestamp(),
                    sheet.duration,
                    sheet.keyboard,
                    sheet.mouse,
                    sheet.overall,
                    sheet.status.as_str(),
                    sheet.submitted_at.map(|d| d.timestamp()),
                    sheet.approved_by_id,
                    sheet.approved_at.map(|d| d.timestamp()),
                    sheet.created_at.timestamp(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Timesheet>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<Option<Timesheet>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(SHEET_BY_ID_QUERY).map_err(map_sql_error)?;
            let mut rows = stmt.query_map(params![id], map_sheet_row).map_err(map_sql_error)?;
            rows.next().transpose().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_week(
        &self,
        employee_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Option<Timesheet>> {
        let db = Arc::clone(&self.db);
        let employee_id = employee_id.to_string();
        task::spawn_blocking(move || -> Result<Option<Timesheet>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(SHEET_BY_WEEK_QUERY).map_err(map_sql_error)?;
            let mut rows = stmt
                .query_map(params![employee_id, week_start.timestamp()], map_sheet_row)
                .map_err(map_sql_error)?;
            rows.next().transpose().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_aggregates(&self, timesheet: &Timesheet) -> Result<()> {
        let db = Arc::clone(&self.db);
        let sheet = timesheet.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                SHEET_UPDATE_AGGREGATES_SQL,
                params![sheet.id, sheet.duration, sheet.keyboard, sheet.mouse, sheet.overall],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_status(&self, timesheet: &Timesheet) -> Result<()> {
        let db = Arc::clone(&self.db);
        let sheet = timesheet.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                SHEET_SAVE_STATUS_SQL,
                params![
                    sheet.id,
                    sheet.status.as_str(),
                    sheet.submitted_at.map(|d| d.timestamp()),
                    sheet.approved_by_id,
                    sheet.approved_at.map(|d| d.timestamp()),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn query(&self, filter: &TimesheetFilter) -> Result<Vec<Timesheet>> {
        let db = Arc::clone(&self.db);
        let (sql, params) = build_sheet_query(filter);
        task::spawn_blocking(move || -> Result<Vec<Timesheet>> {
            let conn = db.get_connection()?;
            let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt.query_map(refs.as_slice(), map_sheet_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const SHEET_COLUMNS: &str = "id, employee_id, started_at, stopped_at, duration, keyboard, mouse, \
     overall, status, submitted_at, approved_by_id, approved_at, created_at";

const SHEET_INSERT_SQL: &str = "INSERT INTO timesheets (
    id, employee_id, started_at, stopped_at, duration, keyboard, mouse, overall, status,
    submitted_at, approved_by_id, approved_at, created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

const SHEET_BY_ID_QUERY: &str = "SELECT id, employee_id, started_at, stopped_at, duration, \
     keyboard, mouse, overall, status, submitted_at, approved_by_id, approved_at, created_at \
     FROM timesheets WHERE id = ?1";

const SHEET_BY_WEEK_QUERY: &str = "SELECT id, employee_id, started_at, stopped_at, duration, \
     keyboard, mouse, overall, status, submitted_at, approved_by_id, approved_at, created_at \
     FROM timesheets WHERE employee_id = ?1 AND started_at = ?2";

const SHEET_UPDATE_AGGREGATES_SQL: &str = "UPDATE timesheets SET duration = ?2, keyboard = ?3, \
     mouse = ?4, overall = ?5 WHERE id = ?1";

const SHEET_SAVE_STATUS_SQL: &str = "UPDATE timesheets SET status = ?2, submitted_at = ?3, \
     approved_by_id = ?4, approved_at = ?5 WHERE id = ?1";

fn map_sheet_row(row: &Row<'_>) -> rusqlite::Result<Timesheet> {
    Ok(Timesheet {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        started_at: datetime_column(row, 2)?,
        stopped_at: datetime_column(row, 3)?,
        duration: row.get(4)?,
        keyboard: row.get(5)?,
        mouse: row.get(6)?,
        overall: row.get(7)?,
        status: parse_status(row, 8)?,
        submitted_at: optional_datetime_column(row, 9)?,
        approved_by_id: row.get(10)?,
        approved_at: optional_datetime_column(row, 11)?,
        created_at: datetime_column(row, 12)?,
    })
}

fn parse_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<TimesheetStatus> {
    let raw: String = row.get(idx)?;
    match raw.as_str() {
        "PENDING" => Ok(TimesheetStatus::Pending),
        "SUBMITTED" => Ok(TimesheetStatus::Submitted),
        "APPROVED" => Ok(TimesheetStatus::Approved),
        "REJECTED" => Ok(TimesheetStatus::Rejected),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown timesheet status: {other}").into(),
        )),
    }
}

fn build_sheet_query(filter: &TimesheetFilter) -> (String, Vec<Box<dyn ToSql + Send>>) {
    let mut sql = format!("SELECT {SHEET_COLUMNS} FROM timesheets WHERE 1=1");
    let mut params: Vec<Box<dyn ToSql + Send>> = Vec::new();

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

    sql.push_str(" ORDER BY started_at");
    (sql, params)
}

//! SQLite-backed activity repository.
//!
//! Activities are append-only; the only writes are batch inserts.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Row, ToSql};
use timetrace_core::ActivityRepository as ActivityRepositoryPort;
use timetrace_domain::{Activity, ActivityFilter, ActivityType, Result};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::time_slot_repository::{datetime_column, placeholders};

pub struct SqliteActivityRepository {
    db: Arc<DbManager>,
}

impl SqliteActivityRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepositoryPort for SqliteActivityRepository {
    async fn insert_batch(&self, activities: &[Activity]) -> Result<()> {
        let db = Arc::clone(&self.db);
        let activities = activities.to_vec();
        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            {
                let mut stmt = tx.prepare(ACTIVITY_INSERT_SQL).map_err(map_sql_error)?;
                for activity in &activities {
                    stmt.execute(params![
                        activity.id,
                        activity.employee_id,
                        activity.time_slot_id,
                        activity.title,
                        activity.duration,
                        activity.activity_type.as_str(),
                        activity.recorded_at.timestamp(),
                        activity.project_id,
                        activity.task_id,
                    ])
                    .map_err(map_sql_error)?;
                }
            }
            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn query(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        let db = Arc::clone(&self.db);
        let (sql, params) = build_activity_query(filter);
        task::spawn_blocking(move || -> Result<Vec<Activity>> {
            let conn = db.get_connection()?;
            let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt.query_map(refs.as_slice(), map_activity_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const ACTIVITY_COLUMNS: &str = "id, employee_id, time_slot_id, title, duration, activity_type, \
     recorded_at, project_id, task_id";

const ACTIVITY_INSERT_SQL: &str = "INSERT INTO activities (
    id, employee_id, time_slot_id, title, duration, activity_type, recorded_at, project_id, task_id
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

fn map_activity_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        time_slot_id: row.get(2)?,
        title: row.get(3)?,
        duration: row.get(4)?,
        activity_type: parse_activity_type(row, 5)?,
        recorded_at: datetime_column(row, 6)?,
        project_id: row.get(7)?,
        task_id: row.get(8)?,
    })
}

fn parse_activity_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<ActivityType> {
    let raw: String = row.get(idx)?;
    match raw.as_str() {
        "APP" => Ok(ActivityType::App),
        "URL" => Ok(ActivityType::Url),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown activity type: {other}").into(),
        )),
    }
}

fn build_activity_query(filter: &ActivityFilter) -> (String, Vec<Box<dyn ToSql + Send>>) {
    let mut sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE 1=1");
    let mut params: Vec<Box<dyn ToSql + Send>> = Vec::new();

    if let Some(start) = filter.start_date {
        sql.push_str(" AND recorded_at >= ?");
        params.push(Box::new(start.timestamp()));
    }
    if let Some(end) = filter.end_date {
        sql.push_str(" AND recorded_at < ?");
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
    if let Some(activity_type) = filter.activity_type {
        sql.push_str(" AND activity_type = ?");
        params.push(Box::new(activity_type.as_str()));
    }
    if let Some(min) = filter.min_duration {
        sql.push_str(" AND duration >= ?");
        params.push(Box::new(min));
    }
    if let Some(max) = filter.max_duration {
        sql.push_str(" AND duration <= ?");
        params.push(Box::new(max));
    }
    if !filter.project_ids.is_empty() {
        sql.push_str(&format!(" AND project_id IN ({})", placeholders(filter.project_ids.len())));
        for id in &filter.project_ids {
            params.push(Box::new(id.clone()));
        }
    }

    sql.push_str(" ORDER BY recorded_at");
    (sql, params)
}

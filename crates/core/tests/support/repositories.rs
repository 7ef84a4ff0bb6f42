//! Mock repository implementations for testing
//!
//! In-memory mocks for all core repository ports, enabling deterministic
//! tests without database dependencies. Unlike fixtures these are fully
//! mutable stores, because the services under test write through them.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use timetrace_core::{
    ActivityRepository, TimeLogRepository, TimeSlotRepository, TimesheetRepository,
};
use timetrace_domain::constants::ACTIVITY_PERCENT_TO_SECONDS;
use timetrace_domain::{
    Activity, ActivityFilter, Result, TimeLog, TimeLogFilter, TimeSlot, TimeSlotFilter,
    Timesheet, TimesheetFilter,
};

/// In-memory mock for `TimeSlotRepository`.
#[derive(Default)]
pub struct InMemoryTimeSlotRepository {
    slots: Mutex<Vec<TimeSlot>>,
    links: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryTimeSlotRepository {
    /// Bucket starts stored for the employee, ascending.
    pub fn starts(&self, employee_id: &str) -> Vec<DateTime<Utc>> {
        let mut starts: Vec<_> = self
            .slots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .map(|s| s.started_at)
            .collect();
        starts.sort();
        starts
    }

    pub fn get(&self, employee_id: &str, started_at: DateTime<Utc>) -> Option<TimeSlot> {
        self.slots
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.employee_id == employee_id && s.started_at == started_at)
            .cloned()
    }

    /// Slot ids linked to the given log.
    pub fn linked(&self, time_log_id: &str) -> Vec<String> {
        self.links.lock().unwrap().get(time_log_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TimeSlotRepository for InMemoryTimeSlotRepository {
    async fn insert(&self, slot: &TimeSlot) -> Result<()> {
        self.slots.lock().unwrap().push(slot.clone());
        Ok(())
    }

    async fn update_metrics(&self, slot: &TimeSlot) -> Result<()> {
        let mut slots = self.slots.lock().unwrap();
        if let Some(existing) = slots.iter_mut().find(|s| s.id == slot.id) {
            *existing = slot.clone();
        }
        Ok(())
    }

    async fn find_by_start(
        &self,
        employee_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<Option<TimeSlot>> {
        Ok(self.get(employee_id, started_at))
    }

    async fn find_in_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>> {
        Ok(self
            .slots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.employee_id == employee_id && s.started_at >= start && s.started_at < end
            })
            .cloned()
            .collect())
    }

    async fn delete_in_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let mut slots = self.slots.lock().unwrap();
        let before = slots.len();
        slots.retain(|s| {
            !(s.employee_id == employee_id && s.started_at >= start && s.started_at < end)
        });
        Ok((before - slots.len()) as u64)
    }

    async fn query(&self, filter: &TimeSlotFilter) -> Result<Vec<TimeSlot>> {
        Ok(self
            .slots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                filter.start_date.map_or(true, |d| s.started_at >= d)
                    && filter.end_date.map_or(true, |d| s.started_at < d)
                    && (filter.employee_ids.is_empty()
                        || filter.employee_ids.contains(&s.employee_id))
                    && filter.activity_level.map_or(true, |level| {
                        s.overall >= level.start * ACTIVITY_PERCENT_TO_SECONDS
                            && s.overall <= level.end * ACTIVITY_PERCENT_TO_SECONDS
                    })
            })
            .cloned()
            .collect())
    }

    async fn link_to_time_log(&self, time_log_id: &str, slot_ids: &[String]) -> Result<()> {
        let mut links = self.links.lock().unwrap();
        let entry = links.entry(time_log_id.to_string()).or_default();
        for id in slot_ids {
            if !entry.contains(id) {
                entry.push(id.clone());
            }
        }
        Ok(())
    }
}

/// In-memory mock for `TimeLogRepository`.
#[derive(Default)]
pub struct InMemoryTimeLogRepository {
    logs: Mutex<HashMap<String, TimeLog>>,
}

impl InMemoryTimeLogRepository {
    pub fn all(&self) -> Vec<TimeLog> {
        let mut logs: Vec<_> = self.logs.lock().unwrap().values().cloned().collect();
        logs.sort_by_key(|l| l.started_at);
        logs
    }

    pub fn get(&self, id: &str) -> Option<TimeLog> {
        self.logs.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl TimeLogRepository for InMemoryTimeLogRepository {
    async fn insert(&self, log: &TimeLog) -> Result<()> {
        self.logs.lock().unwrap().insert(log.id.clone(), log.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TimeLog>> {
        Ok(self.get(id))
    }

    async fn update(&self, log: &TimeLog) -> Result<()> {
        self.logs.lock().unwrap().insert(log.id.clone(), log.clone());
        Ok(())
    }

    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(log) = self.logs.lock().unwrap().get_mut(id) {
            log.deleted_at = Some(at);
        }
        Ok(())
    }

    async fn hard_delete(&self, id: &str) -> Result<()> {
        self.logs.lock().unwrap().remove(id);
        Ok(())
    }

    async fn query(&self, filter: &TimeLogFilter) -> Result<Vec<TimeLog>> {
        let mut logs: Vec<_> = self
            .logs
            .lock()
            .unwrap()
            .values()
            .filter(|l| {
                (filter.include_deleted || l.deleted_at.is_none())
                    && filter.start_date.map_or(true, |d| l.stopped_at > d)
                    && filter.end_date.map_or(true, |d| l.started_at < d)
                    && (filter.employee_ids.is_empty()
                        || filter.employee_ids.contains(&l.employee_id))
                    && (filter.project_ids.is_empty()
                        || l.project_id.as_ref().is_some_and(|p| filter.project_ids.contains(p)))
                    && (filter.source.is_empty() || filter.source.contains(&l.source))
                    && (filter.log_type.is_empty() || filter.log_type.contains(&l.log_type))
            })
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.started_at);
        Ok(logs)
    }
}

/// In-memory mock for `TimesheetRepository`.
#[derive(Default)]
pub struct InMemoryTimesheetRepository {
    sheets: Mutex<HashMap<String, Timesheet>>,
}

impl InMemoryTimesheetRepository {
    pub fn all(&self) -> Vec<Timesheet> {
        let mut sheets: Vec<_> = self.sheets.lock().unwrap().values().cloned().collect();
        sheets.sort_by_key(|t| t.started_at);
        sheets
    }

    pub fn get(&self, id: &str) -> Option<Timesheet> {
        self.sheets.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl TimesheetRepository for InMemoryTimesheetRepository {
    async fn insert(&self, timesheet: &Timesheet) -> Result<()> {
        self.sheets.lock().unwrap().insert(timesheet.id.clone(), timesheet.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Timesheet>> {
        Ok(self.get(id))
    }

    async fn find_by_week(
        &self,
        employee_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Option<Timesheet>> {
        Ok(self
            .sheets
            .lock()
            .unwrap()
            .values()
            .find(|t| t.employee_id == employee_id && t.started_at == week_start)
            .cloned())
    }

    async fn update_aggregates(&self, timesheet: &Timesheet) -> Result<()> {
        self.sheets.lock().unwrap().insert(timesheet.id.clone(), timesheet.clone());
        Ok(())
    }

    async fn save_status(&self, timesheet: &Timesheet) -> Result<()> {
        self.sheets.lock().unwrap().insert(timesheet.id.clone(), timesheet.clone());
        Ok(())
    }

    async fn query(&self, filter: &TimesheetFilter) -> Result<Vec<Timesheet>> {
        let mut sheets: Vec<_> = self
            .sheets
            .lock()
            .unwrap()
            .values()
            .filter(|t| {
                filter.start_date.map_or(true, |d| t.stopped_at > d)
                    && filter.end_date.map_or(true, |d| t.started_at < d)
                    && (filter.employee_ids.is_empty()
                        || filter.employee_ids.contains(&t.employee_id))
            })
            .cloned()
            .collect();
        sheets.sort_by_key(|t| t.started_at);
        Ok(sheets)
    }
}

/// In-memory mock for `ActivityRepository`.
#[derive(Default)]
pub struct InMemoryActivityRepository {
    activities: Mutex<Vec<Activity>>,
}

impl InMemoryActivityRepository {
    pub fn all(&self) -> Vec<Activity> {
        self.activities.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn insert_batch(&self, activities: &[Activity]) -> Result<()> {
        self.activities.lock().unwrap().extend_from_slice(activities);
        Ok(())
    }

    async fn query(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        Ok(self
            .activities
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                filter.start_date.map_or(true, |d| a.recorded_at >= d)
                    && filter.end_date.map_or(true, |d| a.recorded_at < d)
                    && (filter.employee_ids.is_empty()
                        || filter.employee_ids.contains(&a.employee_id))
                    && filter.activity_type.map_or(true, |t| a.activity_type == t)
                    && filter.min_duration.map_or(true, |d| a.duration >= d)
                    && filter.max_duration.map_or(true, |d| a.duration <= d)
                    && (filter.project_ids.is_empty()
                        || a.project_id.as_ref().is_some_and(|p| filter.project_ids.contains(p)))
            })
            .cloned()
            .collect())
    }
}

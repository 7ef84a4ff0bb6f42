//! Time-log interval manager service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use timetrace_domain::{
    NewTimeLog, ReportedTimeSlot, Result, TimeLog, TimeLogFilter, TimetraceError, UpdateTimeLog,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::employee_lock::EmployeeLockRegistry;
use crate::intervals::week_start;
use crate::time_slot::TimeSlotService;
use crate::timesheet::TimesheetService;

use super::ports::TimeLogRepository;

/// Manages work intervals and keeps the slot grid and weekly timesheets
/// consistent with every edit.
///
/// All mutating operations serialize on the employee's lock, so overlapping
/// edits for one employee apply one at a time.
pub struct TimeLogService {
    time_logs: Arc<dyn TimeLogRepository>,
    time_slots: Arc<TimeSlotService>,
    timesheets: Arc<TimesheetService>,
    locks: Arc<EmployeeLockRegistry>,
}

impl TimeLogService {
    pub fn new(
        time_logs: Arc<dyn TimeLogRepository>,
        time_slots: Arc<TimeSlotService>,
        timesheets: Arc<TimesheetService>,
        locks: Arc<EmployeeLockRegistry>,
    ) -> Self {
        Self { time_logs, time_slots, timesheets, locks }
    }

    /// Record a new interval.
    ///
    /// Assigns the log to its week's timesheet (creating it if needed),
    /// stores any reported slot metrics, fills the remaining buckets with
    /// blanks, links the covering slots to the log and recalculates the
    /// timesheet.
    pub async fn create(&self, new: NewTimeLog) -> Result<TimeLog> {
        if new.employee_id.is_empty() {
            return Err(TimetraceError::InvalidInput("employee_id is required".to_string()));
        }
        if new.stopped_at <= new.started_at {
            return Err(TimetraceError::InvalidInput(
                "stopped_at must be after started_at".to_string(),
            ));
        }

        let _guard = self.locks.acquire(&new.employee_id).await;

        let timesheet = self.timesheets.first_or_create(&new.employee_id, new.started_at).await?;
        let log = TimeLog {
            id: Uuid::new_v4().to_string(),
            employee_id: new.employee_id.clone(),
            timesheet_id: timesheet.id.clone(),
            started_at: new.started_at,
            stopped_at: new.stopped_at,
            project_id: new.project_id,
            task_id: new.task_id,
            organization_contact_id: new.organization_contact_id,
            log_type: new.log_type,
            source: new.source,
            description: new.description,
            is_billable: new.is_billable,
            deleted_at: None,
            created_at: Utc::now(),
        };
        self.time_logs.insert(&log).await?;

        // The log row is already committed; surface any failure in slot or
        // timesheet bookkeeping as one coarse error so callers see a single
        // failure mode for the whole post-insert phase.
        if let Err(err) = self.attach_slots(&log, &new.time_slots).await {
            error!(log_id = %log.id, %err, "slot bookkeeping failed after log insert");
            return Err(TimetraceError::Internal(
                "cannot create time log for time slot".to_string(),
            ));
        }

        debug!(log_id = %log.id, employee_id = %log.employee_id, "created time log");
        Ok(log)
    }

    async fn attach_slots(&self, log: &TimeLog, reported: &[ReportedTimeSlot]) -> Result<()> {
        self.time_slots.bulk_create_or_update(&log.employee_id, reported.to_vec()).await?;
        let covering =
            self.time_slots.bulk_create(&log.employee_id, log.started_at, log.stopped_at).await?;
        self.time_slots.link_to_time_log(&log.id, &covering).await?;
        self.timesheets.recalculate(&log.timesheet_id).await?;
        Ok(())
    }

    /// Apply a partial update to an interval.
    ///
    /// When the span changes, only the old span's buckets outside the new
    /// span are dropped; buckets covered by both spans keep their metrics.
    /// The new span is then covered with slots and the log moves to the new
    /// week's timesheet if the week changed. Both affected timesheets are
    /// recalculated.
    pub async fn update(&self, id: &str, changes: UpdateTimeLog) -> Result<TimeLog> {
        let owner = self.load_active(id).await?;
        let _guard = self.locks.acquire(&owner.employee_id).await;
        // The owner lookup ran outside the lock; take the working snapshot
        // under it so a concurrent edit cannot hand us a stale row.
        let mut log = self.load_active(id).await?;

        let old_start = log.started_at;
        let old_stop = log.stopped_at;
        let old_timesheet_id = log.timesheet_id.clone();

        apply_changes(&mut log, changes);
        if log.stopped_at <= log.started_at {
            return Err(TimetraceError::InvalidInput(
                "stopped_at must be after started_at".to_string(),
            ));
        }

        let span_changed = log.started_at != old_start || log.stopped_at != old_stop;
        if !span_changed {
            self.time_logs.update(&log).await?;
            self.timesheets.recalculate(&log.timesheet_id).await?;
            return Ok(log);
        }

        let timesheet =
            self.timesheets.first_or_create(&log.employee_id, log.started_at).await?;
        log.timesheet_id = timesheet.id.clone();

        self.time_slots
            .delete_conflicting(
                &log.employee_id,
                old_start,
                old_stop,
                log.started_at,
                log.stopped_at,
            )
            .await?;
        self.time_logs.update(&log).await?;
        let covering =
            self.time_slots.bulk_create(&log.employee_id, log.started_at, log.stopped_at).await?;
        self.time_slots.link_to_time_log(&log.id, &covering).await?;

        self.timesheets.recalculate(&old_timesheet_id).await?;
        if log.timesheet_id != old_timesheet_id {
            self.timesheets.recalculate(&log.timesheet_id).await?;
        }
        debug!(log_id = %log.id, "updated time log span");
        Ok(log)
    }

    /// Delete intervals. Soft by default; `force` removes the rows and
    /// their covering slots. Affected timesheets are recalculated.
    pub async fn delete(&self, ids: &[String], force: bool) -> Result<u64> {
        let mut removed = 0;
        for id in ids {
            let Some(owner) = self.time_logs.find_by_id(id).await? else {
                warn!(log_id = %id, "delete skipped missing time log");
                continue;
            };
            let _guard = self.locks.acquire(&owner.employee_id).await;
            // Re-read under the lock; a concurrent delete may have won.
            let Some(log) = self.time_logs.find_by_id(id).await? else {
                continue;
            };
            if force {
                self.time_logs.hard_delete(&log.id).await?;
                self.time_slots
                    .range_delete(&log.employee_id, log.started_at, log.stopped_at)
                    .await?;
            } else {
                if log.deleted_at.is_some() {
                    continue;
                }
                self.time_logs.soft_delete(&log.id, Utc::now()).await?;
            }
            self.timesheets.recalculate(&log.timesheet_id).await?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Carve the span `[start, end]` out of the given interval.
    ///
    /// Depending on how the span overlaps the interval this deletes it,
    /// trims one end, or splits it in two; the covered buckets are removed
    /// and the surviving portions re-covered. Returns `false` without
    /// touching anything when the span and the interval are disjoint.
    pub async fn delete_time_span(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        log_id: &str,
    ) -> Result<bool> {
        if end <= start {
            return Err(TimetraceError::InvalidInput(
                "span end must be after span start".to_string(),
            ));
        }
        let owner = self.load_active(log_id).await?;
        let _guard = self.locks.acquire(&owner.employee_id).await;
        // Re-read under the lock so the branch choice uses the current row.
        let mut log = self.load_active(log_id).await?;

        let (s, e) = (log.started_at, log.stopped_at);
        if e < start || s > end {
            return Ok(false);
        }

        // Inclusive endpoint membership drives the branch choice.
        let start_inside = start <= s && s <= end;
        let stop_inside = start <= e && e <= end;
        let employee_id = log.employee_id.clone();
        let timesheet_id = log.timesheet_id.clone();
        let mut extra_timesheet_id: Option<String> = None;

        if start_inside && stop_inside {
            // Whole interval covered by the span.
            self.time_logs.hard_delete(&log.id).await?;
            self.time_slots.range_delete(&employee_id, s, e).await?;
        } else if start_inside {
            // Span covers the head; the tail [end, e] survives.
            if (e - end).num_seconds() > 0 {
                log.started_at = end;
                if week_start(end) != week_start(s) {
                    // The surviving tail starts in a later calendar week, so
                    // it moves to that week's timesheet.
                    let sheet = self.timesheets.first_or_create(&employee_id, end).await?;
                    extra_timesheet_id = Some(sheet.id.clone());
                    log.timesheet_id = sheet.id;
                }
                self.time_logs.update(&log).await?;
                self.time_slots.range_delete(&employee_id, s, end).await?;
                self.recover(&log).await?;
            } else {
                self.time_logs.hard_delete(&log.id).await?;
                self.time_slots.range_delete(&employee_id, s, e).await?;
            }
        } else if stop_inside {
            // Span covers the tail; the head [s, start] survives.
            if (start - s).num_seconds() > 0 {
                log.stopped_at = start;
                self.time_logs.update(&log).await?;
                self.time_slots.range_delete(&employee_id, start, e).await?;
                self.recover(&log).await?;
            } else {
                self.time_logs.hard_delete(&log.id).await?;
                self.time_slots.range_delete(&employee_id, s, e).await?;
            }
        } else {
            // Span strictly inside the interval: split into head and tail.
            let head_kept = (start - s).num_seconds() > 0;
            if head_kept {
                log.stopped_at = start;
                self.time_logs.update(&log).await?;
            } else {
                self.time_logs.hard_delete(&log.id).await?;
            }
            self.time_slots.range_delete(&employee_id, start, end).await?;
            if head_kept {
                self.recover(&log).await?;
            }

            if (e - end).num_seconds() > 0 {
                let tail_timesheet_id = if week_start(end) == week_start(s) {
                    timesheet_id.clone()
                } else {
                    // The tail falls in a different calendar week.
                    let sheet = self.timesheets.first_or_create(&employee_id, end).await?;
                    extra_timesheet_id = Some(sheet.id.clone());
                    sheet.id
                };
                let tail = TimeLog {
                    id: Uuid::new_v4().to_string(),
                    timesheet_id: tail_timesheet_id,
                    started_at: end,
                    stopped_at: e,
                    deleted_at: None,
                    created_at: Utc::now(),
                    ..log.clone()
                };
                self.time_logs.insert(&tail).await?;
                self.recover(&tail).await?;
            }
        }

        self.timesheets.recalculate(&timesheet_id).await?;
        if let Some(extra) = extra_timesheet_id {
            self.timesheets.recalculate(&extra).await?;
        }
        debug!(log_id, "deleted time span");
        Ok(true)
    }

    pub async fn get_time_logs(&self, filter: &TimeLogFilter) -> Result<Vec<TimeLog>> {
        self.time_logs.query(filter).await
    }

    /// Re-cover a surviving interval with slots, preserving any buckets
    /// that still exist, and link them to the log.
    async fn recover(&self, log: &TimeLog) -> Result<()> {
        let covering =
            self.time_slots.bulk_create(&log.employee_id, log.started_at, log.stopped_at).await?;
        self.time_slots.link_to_time_log(&log.id, &covering).await
    }

    async fn load_active(&self, id: &str) -> Result<TimeLog> {
        match self.time_logs.find_by_id(id).await? {
            Some(log) if log.deleted_at.is_none() => Ok(log),
            _ => Err(TimetraceError::NotFound(format!("time log {id}"))),
        }
    }
}

fn apply_changes(log: &mut TimeLog, changes: UpdateTimeLog) {
    if let Some(started_at) = changes.started_at {
        log.started_at = started_at;
    }
    if let Some(stopped_at) = changes.stopped_at {
        log.stopped_at = stopped_at;
    }
    if let Some(project_id) = changes.project_id {
        log.project_id = Some(project_id);
    }
    if let Some(task_id) = changes.task_id {
        log.task_id = Some(task_id);
    }
    if let Some(contact_id) = changes.organization_contact_id {
        log.organization_contact_id = Some(contact_id);
    }
    if let Some(description) = changes.description {
        log.description = Some(description);
    }
    if let Some(is_billable) = changes.is_billable {
        log.is_billable = is_billable;
    }
}

//! End-to-end tests for interval creation and the time-span edit/delete
//! algorithm, run against in-memory repositories.

mod support;

use chrono::{DateTime, TimeZone, Utc};
use timetrace_core::TimeLogRepository;
use timetrace_domain::{
    NewTimeLog, ReportedTimeSlot, TimeLogFilter, TimeLogSource, TimeLogType, TimetraceError,
};

use support::Harness;

const EMP: &str = "emp-1";

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, h, m, 0).single().unwrap()
}

fn manual_log(started_at: DateTime<Utc>, stopped_at: DateTime<Utc>) -> NewTimeLog {
    NewTimeLog {
        employee_id: EMP.to_string(),
        started_at,
        stopped_at,
        project_id: Some("proj-1".to_string()),
        task_id: None,
        organization_contact_id: None,
        log_type: TimeLogType::Manual,
        source: TimeLogSource::Desktop,
        description: Some("writing docs".to_string()),
        is_billable: true,
        time_slots: Vec::new(),
    }
}

#[tokio::test]
async fn create_covers_interval_with_aligned_buckets() {
    let h = Harness::new();

    let log = h.log_service.create(manual_log(at(6, 9, 2), at(6, 9, 27))).await.unwrap();

    assert_eq!(h.slots.starts(EMP), vec![at(6, 9, 0), at(6, 9, 10), at(6, 9, 20)]);
    assert_eq!(h.slots.linked(&log.id).len(), 3);

    // Blank durations are the seconds of overlap with the interval, so the
    // week's rollup equals the interval length.
    let sheet = h.sheets.get(&log.timesheet_id).unwrap();
    assert_eq!(sheet.duration, 25 * 60);
}

#[tokio::test]
async fn create_stores_reported_metrics_and_skips_existing_buckets() {
    let h = Harness::new();

    let mut new = manual_log(at(6, 9, 2), at(6, 9, 27));
    new.time_slots = vec![ReportedTimeSlot {
        started_at: at(6, 9, 4),
        duration: 600,
        keyboard: 100,
        mouse: 50,
        overall: 120,
    }];
    h.log_service.create(new).await.unwrap();

    // Reported metrics land in the floored bucket; coverage fills the rest.
    let slot = h.slots.get(EMP, at(6, 9, 0)).unwrap();
    assert_eq!(slot.overall, 120);
    assert_eq!(slot.keyboard, 100);
    assert_eq!(h.slots.starts(EMP).len(), 3);
}

#[tokio::test]
async fn repeated_report_for_same_bucket_overwrites() {
    let h = Harness::new();

    let report = |overall| ReportedTimeSlot {
        started_at: at(6, 9, 3),
        duration: 600,
        keyboard: 10,
        mouse: 10,
        overall,
    };
    h.slot_service.upsert(EMP, report(60)).await.unwrap();
    let second = h.slot_service.upsert(EMP, report(240)).await.unwrap();

    assert_eq!(h.slots.starts(EMP), vec![at(6, 9, 0)]);
    assert_eq!(second.overall, 240);
    assert_eq!(h.slots.get(EMP, at(6, 9, 0)).unwrap().overall, 240);
}

#[tokio::test]
async fn batch_report_returns_slots_in_input_order() {
    let h = Harness::new();

    let report = |h_, m, overall| ReportedTimeSlot {
        started_at: at(6, h_, m),
        duration: 600,
        keyboard: 0,
        mouse: 0,
        overall,
    };
    let stored = h
        .slot_service
        .bulk_create_or_update(EMP, vec![report(9, 20, 30), report(9, 0, 90)])
        .await
        .unwrap();

    let starts: Vec<_> = stored.iter().map(|s| s.started_at).collect();
    assert_eq!(starts, vec![at(6, 9, 20), at(6, 9, 0)]);
    assert_eq!(h.slots.get(EMP, at(6, 9, 0)).unwrap().overall, 90);
}

#[tokio::test]
async fn create_rejects_inverted_interval() {
    let h = Harness::new();
    let err = h.log_service.create(manual_log(at(6, 10, 0), at(6, 9, 0))).await.unwrap_err();
    assert!(matches!(err, TimetraceError::InvalidInput(_)));
}

#[tokio::test]
async fn span_covering_whole_log_removes_everything() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();

    let changed = h.log_service.delete_time_span(at(6, 8, 50), at(6, 9, 40), &log.id).await.unwrap();

    assert!(changed);
    assert!(h.logs.all().is_empty());
    assert!(h.slots.starts(EMP).is_empty());
    assert_eq!(h.sheets.get(&log.timesheet_id).unwrap().duration, 0);
}

#[tokio::test]
async fn span_over_head_trims_log_start() {
    let h = Harness::new();
    let mut new = manual_log(at(6, 9, 0), at(6, 10, 0));
    new.time_slots = vec![ReportedTimeSlot {
        started_at: at(6, 9, 30),
        duration: 600,
        keyboard: 0,
        mouse: 0,
        overall: 120,
    }];
    let log = h.log_service.create(new).await.unwrap();

    let changed = h.log_service.delete_time_span(at(6, 9, 0), at(6, 9, 30), &log.id).await.unwrap();

    assert!(changed);
    let log = h.logs.get(&log.id).unwrap();
    assert_eq!(log.started_at, at(6, 9, 30));
    assert_eq!(log.stopped_at, at(6, 10, 0));
    assert_eq!(h.slots.starts(EMP), vec![at(6, 9, 30), at(6, 9, 40), at(6, 9, 50)]);
    // The surviving bucket keeps the metrics it had before the edit.
    assert_eq!(h.slots.get(EMP, at(6, 9, 30)).unwrap().overall, 120);
    assert_eq!(h.sheets.get(&log.timesheet_id).unwrap().duration, 30 * 60);
}

#[tokio::test]
async fn span_over_tail_trims_log_stop() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 10, 0))).await.unwrap();

    let changed =
        h.log_service.delete_time_span(at(6, 9, 40), at(6, 10, 10), &log.id).await.unwrap();

    assert!(changed);
    let log = h.logs.get(&log.id).unwrap();
    assert_eq!(log.stopped_at, at(6, 9, 40));
    assert_eq!(
        h.slots.starts(EMP),
        vec![at(6, 9, 0), at(6, 9, 10), at(6, 9, 20), at(6, 9, 30)]
    );
    assert_eq!(h.sheets.get(&log.timesheet_id).unwrap().duration, 40 * 60);
}

#[tokio::test]
async fn span_matching_surviving_portion_deletes_instead_of_zero_length_log() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();

    // Span begins at the log start and ends exactly at the log stop: no
    // tail remains, so the log is removed rather than kept at zero length.
    let changed = h.log_service.delete_time_span(at(6, 9, 0), at(6, 9, 30), &log.id).await.unwrap();

    assert!(changed);
    assert!(h.logs.get(&log.id).is_none());
    assert!(h.slots.starts(EMP).is_empty());
}

#[tokio::test]
async fn interior_span_splits_log_in_two() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 10, 0))).await.unwrap();

    let changed = h.log_service.delete_time_span(at(6, 9, 20), at(6, 9, 40), &log.id).await.unwrap();

    assert!(changed);
    let logs = h.logs.all();
    assert_eq!(logs.len(), 2);
    let head = &logs[0];
    let tail = &logs[1];
    assert_eq!(head.id, log.id);
    assert_eq!((head.started_at, head.stopped_at), (at(6, 9, 0), at(6, 9, 20)));
    assert_eq!((tail.started_at, tail.stopped_at), (at(6, 9, 40), at(6, 10, 0)));
    assert_ne!(tail.id, head.id);
    assert_eq!(tail.project_id, head.project_id);
    assert_eq!(tail.timesheet_id, head.timesheet_id);

    assert_eq!(
        h.slots.starts(EMP),
        vec![at(6, 9, 0), at(6, 9, 10), at(6, 9, 40), at(6, 9, 50)]
    );
    assert!(!h.slots.linked(&tail.id).is_empty());
    assert_eq!(h.sheets.get(&head.timesheet_id).unwrap().duration, 40 * 60);
}

#[tokio::test]
async fn unaligned_interior_span_recovers_partial_buckets() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 10, 0))).await.unwrap();

    h.log_service.delete_time_span(at(6, 9, 5), at(6, 9, 35), &log.id).await.unwrap();

    // Buckets 09:00 and 09:30 are re-covered as blanks sized to the
    // surviving overlap; the rollup still equals the sum of log lengths.
    assert_eq!(
        h.slots.starts(EMP),
        vec![at(6, 9, 0), at(6, 9, 30), at(6, 9, 40), at(6, 9, 50)]
    );
    assert_eq!(h.slots.get(EMP, at(6, 9, 0)).unwrap().duration, 5 * 60);
    assert_eq!(h.slots.get(EMP, at(6, 9, 30)).unwrap().duration, 5 * 60);
    assert_eq!(h.sheets.all()[0].duration, 30 * 60);
}

#[tokio::test]
async fn disjoint_span_is_a_noop() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();

    let changed =
        h.log_service.delete_time_span(at(6, 11, 0), at(6, 11, 30), &log.id).await.unwrap();

    assert!(!changed);
    assert_eq!(h.logs.get(&log.id).unwrap().stopped_at, at(6, 9, 30));
    assert_eq!(h.slots.starts(EMP).len(), 3);
}

#[tokio::test]
async fn inverted_span_is_rejected() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();
    let err =
        h.log_service.delete_time_span(at(6, 9, 20), at(6, 9, 10), &log.id).await.unwrap_err();
    assert!(matches!(err, TimetraceError::InvalidInput(_)));
}

#[tokio::test]
async fn split_tail_in_next_week_gets_its_own_timesheet() {
    let h = Harness::new();
    // Sunday 2024-03-10 23:00 through Monday 2024-03-11 01:00.
    let log = h.log_service.create(manual_log(at(10, 23, 0), at(11, 1, 0))).await.unwrap();

    h.log_service.delete_time_span(at(10, 23, 30), at(11, 0, 30), &log.id).await.unwrap();

    let sheets = h.sheets.all();
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].started_at, at(4, 0, 0));
    assert_eq!(sheets[1].started_at, at(11, 0, 0));

    let logs = h.logs.all();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].timesheet_id, sheets[0].id);
    assert_eq!(logs[1].timesheet_id, sheets[1].id);
    // Each week's rollup covers exactly its own slots.
    assert_eq!(sheets[0].duration, 30 * 60);
    assert_eq!(sheets[1].duration, 30 * 60);
}

#[tokio::test]
async fn head_trim_crossing_week_moves_log_to_new_timesheet() {
    let h = Harness::new();
    // Sunday 2024-03-10 23:00 through Monday 2024-03-11 02:00.
    let log = h.log_service.create(manual_log(at(10, 23, 0), at(11, 2, 0))).await.unwrap();
    let old_sheet = log.timesheet_id.clone();

    h.log_service.delete_time_span(at(10, 22, 0), at(11, 1, 0), &log.id).await.unwrap();

    let log = h.logs.get(&log.id).unwrap();
    assert_eq!((log.started_at, log.stopped_at), (at(11, 1, 0), at(11, 2, 0)));

    // The surviving tail starts on Monday, so the log belongs to the
    // Monday week's timesheet and that week carries its hour.
    let sheets = h.sheets.all();
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[1].started_at, at(11, 0, 0));
    assert_eq!(log.timesheet_id, sheets[1].id);
    assert_eq!(h.sheets.get(&old_sheet).unwrap().duration, 0);
    assert_eq!(h.sheets.get(&log.timesheet_id).unwrap().duration, 60 * 60);
}

#[tokio::test]
async fn concurrent_editor_cannot_revive_a_removed_log() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 10, 0))).await.unwrap();

    // One editor holds the employee lock and removes the log while a
    // second span edit is already waiting on the lock.
    let guard = h.locks.acquire(EMP).await;
    let service = h.log_service.clone();
    let id = log.id.clone();
    let edit =
        tokio::spawn(async move { service.delete_time_span(at(6, 9, 20), at(6, 9, 40), &id).await });
    tokio::task::yield_now().await;

    h.logs.hard_delete(&log.id).await.unwrap();
    h.slot_service.range_delete(EMP, at(6, 9, 0), at(6, 10, 0)).await.unwrap();
    drop(guard);

    let err = edit.await.unwrap().unwrap_err();
    assert!(matches!(err, TimetraceError::NotFound(_)));
    // The waiting edit saw the current state and re-created nothing.
    assert!(h.logs.get(&log.id).is_none());
    assert!(h.slots.starts(EMP).is_empty());
}

#[tokio::test]
async fn update_without_span_change_keeps_slots() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();

    let updated = h
        .log_service
        .update(
            &log.id,
            timetrace_domain::UpdateTimeLog {
                description: Some("standup notes".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description.as_deref(), Some("standup notes"));
    assert_eq!(h.slots.starts(EMP).len(), 3);
}

#[tokio::test]
async fn update_moving_span_to_next_week_reassigns_timesheet() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();
    let old_sheet = log.timesheet_id.clone();

    let updated = h
        .log_service
        .update(
            &log.id,
            timetrace_domain::UpdateTimeLog {
                started_at: Some(at(13, 9, 0)),
                stopped_at: Some(at(13, 9, 30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_ne!(updated.timesheet_id, old_sheet);
    assert_eq!(h.sheets.get(&old_sheet).unwrap().duration, 0);
    assert_eq!(h.sheets.get(&updated.timesheet_id).unwrap().duration, 30 * 60);
    assert_eq!(h.slots.starts(EMP), vec![at(13, 9, 0), at(13, 9, 10), at(13, 9, 20)]);
}

#[tokio::test]
async fn update_shifting_span_keeps_metrics_in_overlapping_buckets() {
    let h = Harness::new();
    let mut new = manual_log(at(6, 9, 0), at(6, 10, 0));
    new.time_slots = vec![ReportedTimeSlot {
        started_at: at(6, 9, 30),
        duration: 600,
        keyboard: 40,
        mouse: 20,
        overall: 90,
    }];
    let log = h.log_service.create(new).await.unwrap();

    let updated = h
        .log_service
        .update(
            &log.id,
            timetrace_domain::UpdateTimeLog {
                started_at: Some(at(6, 9, 20)),
                stopped_at: Some(at(6, 10, 20)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Only the buckets outside the new span are dropped; the overlap keeps
    // its tracked metrics.
    assert_eq!(
        h.slots.starts(EMP),
        vec![at(6, 9, 20), at(6, 9, 30), at(6, 9, 40), at(6, 9, 50), at(6, 10, 0), at(6, 10, 10)]
    );
    assert_eq!(h.slots.get(EMP, at(6, 9, 30)).unwrap().overall, 90);
    assert_eq!(h.sheets.get(&updated.timesheet_id).unwrap().duration, 60 * 60);
}

#[tokio::test]
async fn soft_delete_hides_log_until_included() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();

    let removed = h.log_service.delete(&[log.id.clone()], false).await.unwrap();
    assert_eq!(removed, 1);

    let visible = h.log_service.get_time_logs(&TimeLogFilter::default()).await.unwrap();
    assert!(visible.is_empty());

    let all = h
        .log_service
        .get_time_logs(&TimeLogFilter { include_deleted: true, ..Default::default() })
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    // Soft deletes keep the slot grid.
    assert_eq!(h.slots.starts(EMP).len(), 3);

    // Span edits no longer see the deleted log.
    let err = h
        .log_service
        .delete_time_span(at(6, 9, 0), at(6, 9, 30), &log.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TimetraceError::NotFound(_)));
}

#[tokio::test]
async fn force_delete_removes_rows_and_slots() {
    let h = Harness::new();
    let log = h.log_service.create(manual_log(at(6, 9, 0), at(6, 9, 30))).await.unwrap();

    h.log_service.delete(&[log.id.clone()], true).await.unwrap();

    assert!(h.logs.get(&log.id).is_none());
    assert!(h.slots.starts(EMP).is_empty());
    assert_eq!(h.sheets.get(&log.timesheet_id).unwrap().duration, 0);
}

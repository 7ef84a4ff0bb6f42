//! Bucket-interval math
//!
//! Pure helpers shared by the creation and deletion paths. Every piece of
//! bucket alignment in the system goes through this module so that the two
//! paths can never disagree about where a bucket starts.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use timetrace_domain::constants::{DAYS_PER_WEEK, SLOT_INTERVAL_MINUTES};

/// Drop seconds and sub-second precision from a timestamp.
pub fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(ts)
}

/// Floor a timestamp to the start of the 10-minute bucket containing it.
pub fn floor_to_slot(ts: DateTime<Utc>) -> DateTime<Utc> {
    let minute = truncate_to_minute(ts);
    minute - Duration::minutes(i64::from(minute.minute()) % SLOT_INTERVAL_MINUTES)
}

/// Lazy sequence of bucket starts covering `[start, end)`, one every
/// 10 minutes, each floored to its bucket boundary.
///
/// Restartable: the iterator is cheap to build and `Clone`, so callers can
/// walk the same interval more than once.
pub fn generate_time_slots(start: DateTime<Utc>, end: DateTime<Utc>) -> SlotStarts {
    SlotStarts { cursor: start, end }
}

/// Iterator produced by [`generate_time_slots`].
#[derive(Debug, Clone)]
pub struct SlotStarts {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Iterator for SlotStarts {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }
        let slot = floor_to_slot(self.cursor);
        self.cursor += Duration::minutes(SLOT_INTERVAL_MINUTES);
        Some(slot)
    }
}

/// Half-open deletion bounds for a span, snapped outward to bucket
/// boundaries.
///
/// The lower bound is the bucket containing `start`; the upper bound is the
/// first bucket start at or after `end`. Any bucket that even partially
/// overlaps the span falls inside the bounds, while a bucket starting
/// exactly at `end` stays outside them.
pub fn delete_bounds(start: DateTime<Utc>, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let lo = floor_to_slot(start);
    let floored_end = floor_to_slot(end);
    let hi = if floored_end == end {
        end
    } else {
        floored_end + Duration::minutes(SLOT_INTERVAL_MINUTES)
    };
    (lo, hi)
}

/// Seconds of overlap between the bucket starting at `bucket` and the
/// interval `[start, end)`.
pub fn slot_overlap_seconds(
    bucket: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> i64 {
    let bucket_end = bucket + Duration::minutes(SLOT_INTERVAL_MINUTES);
    let lo = start.max(bucket);
    let hi = end.min(bucket_end);
    (hi - lo).num_seconds().max(0)
}

/// Start of the calendar week (Monday 00:00 UTC) containing `ts`.
pub fn week_start(ts: DateTime<Utc>) -> DateTime<Utc> {
    let date = ts.date_naive();
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    monday.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

/// Half-open `[monday, monday + 7d)` bounds of the week containing `ts`.
pub fn week_bounds(ts: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = week_start(ts);
    (start, start + Duration::days(DAYS_PER_WEEK))
}

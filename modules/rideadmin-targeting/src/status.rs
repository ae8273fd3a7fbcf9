//! Lifecycle status of a scheduled ad.
//!
//! Rules, first match wins:
//!
//! 1. Kill switch off → `Inactive`
//! 2. Scheduling disabled → `Active`
//! 3. Start after end (bad data) → `Active`, logged at debug
//! 4. A bound is missing → decided by [`IncompleteSchedulePolicy`]
//! 5. `now < start` → `Upcoming`
//! 6. `start <= now <= end` → `Active`
//! 7. `now > end` → `Expired`

use chrono::{DateTime, Utc};
use tracing::debug;

use rideadmin_common::{AdRecord, AdStatus, IncompleteSchedulePolicy};

/// Status under the default policy: an incomplete schedule is always active.
pub fn evaluate(record: &AdRecord, now: DateTime<Utc>) -> AdStatus {
    evaluate_with(record, now, IncompleteSchedulePolicy::AlwaysActive)
}

pub fn evaluate_with(
    record: &AdRecord,
    now: DateTime<Utc>,
    policy: IncompleteSchedulePolicy,
) -> AdStatus {
    if !record.is_active {
        return AdStatus::Inactive;
    }

    let schedule = &record.schedule;
    if !schedule.enabled {
        return AdStatus::Active;
    }

    match (schedule.start_date, schedule.end_date) {
        (Some(start), Some(end)) if start > end => {
            debug!(%start, %end, "Schedule starts after it ends, treating as always active");
            AdStatus::Active
        }
        (Some(start), Some(end)) => within_window(now, Some(start), Some(end)),
        (start, end) => match policy {
            IncompleteSchedulePolicy::AlwaysActive => AdStatus::Active,
            IncompleteSchedulePolicy::OpenEnded => within_window(now, start, end),
        },
    }
}

/// Inclusive window check. A missing bound never excludes.
fn within_window(
    now: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> AdStatus {
    if start.is_some_and(|s| now < s) {
        AdStatus::Upcoming
    } else if end.is_some_and(|e| now > e) {
        AdStatus::Expired
    } else {
        AdStatus::Active
    }
}

//! Review-queue ordering, applied on top of a filtered list.

use std::borrow::Borrow;
use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use rideadmin_common::VehicleVerification;

/// Stable sort by `rank` ascending, then `recency` newest first. Records with
/// no timestamp go last within their rank.
pub fn sort_by_priority<R, K, T>(records: &mut [R], rank: K, recency: T)
where
    K: Fn(&R) -> usize,
    T: Fn(&R) -> Option<DateTime<Utc>>,
{
    records.sort_by_key(|record| (rank(record), Reverse(recency(record))));
}

/// Pending first, then resubmitted, rejected, approved; newest submission first.
pub fn sort_verifications<V: Borrow<VehicleVerification>>(records: &mut [V]) {
    sort_by_priority(
        records,
        |v| v.borrow().status.priority(),
        |v| v.borrow().submitted_at,
    );
}

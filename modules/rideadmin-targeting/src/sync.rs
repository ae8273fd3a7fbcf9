//! Stored-vs-computed status reconciliation.
//!
//! The document store keeps whatever status was last written. This module
//! only works out which ads are stale; writing the new value back is the
//! caller's job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use rideadmin_common::{AdStatus, CarouselAd, IncompleteSchedulePolicy};

use crate::status::evaluate_with;

/// True when the stored value does not match `computed`. A missing or
/// unrecognised stored value always needs a sync.
pub fn needs_sync(stored: Option<&str>, computed: AdStatus) -> bool {
    stored.and_then(AdStatus::parse) != Some(computed)
}

/// One pending write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub id: String,
    /// Raw stored value, as found in the document
    pub stored: Option<String>,
    pub computed: AdStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub checked: u32,
    pub stale: u32,
}

/// Every ad whose stored status disagrees with the computed one, in input order.
pub fn plan_status_sync(
    ads: &[CarouselAd],
    now: DateTime<Utc>,
    policy: IncompleteSchedulePolicy,
) -> (Vec<StatusChange>, SyncStats) {
    let mut stats = SyncStats::default();
    let mut changes = Vec::new();

    for ad in ads {
        stats.checked += 1;
        let computed = evaluate_with(&ad.ad_record(), now, policy);
        if needs_sync(ad.status.as_deref(), computed) {
            stats.stale += 1;
            changes.push(StatusChange {
                id: ad.id.clone(),
                stored: ad.status.clone(),
                computed,
            });
        }
    }

    info!(checked = stats.checked, stale = stats.stale, "Status sync planned");
    (changes, stats)
}

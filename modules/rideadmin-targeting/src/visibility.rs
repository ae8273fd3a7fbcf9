//! Whether a viewer should see an ad right now.

use chrono::{DateTime, Utc};

use rideadmin_common::{AdStatus, CarouselAd, GeoPoint, IncompleteSchedulePolicy};

use crate::geo_filter::is_within_fence;
use crate::status::evaluate_with;

/// Active now, and either untargeted or targeted at the viewer's location.
/// A fenced ad is hidden from a viewer whose location is unknown.
pub fn is_visible(
    ad: &CarouselAd,
    now: DateTime<Utc>,
    viewer: Option<&GeoPoint>,
    policy: IncompleteSchedulePolicy,
) -> bool {
    if evaluate_with(&ad.ad_record(), now, policy) != AdStatus::Active {
        return false;
    }
    match (&ad.geofence, viewer) {
        (None, _) => true,
        (Some(fence), Some(point)) => is_within_fence(point, fence),
        (Some(_), None) => false,
    }
}

/// Visible ads in carousel order: `priority` ascending, ties keep input order.
pub fn visible_ads<'a>(
    ads: &'a [CarouselAd],
    now: DateTime<Utc>,
    viewer: Option<&GeoPoint>,
    policy: IncompleteSchedulePolicy,
) -> Vec<&'a CarouselAd> {
    let mut visible: Vec<&CarouselAd> = ads
        .iter()
        .filter(|ad| is_visible(ad, now, viewer, policy))
        .collect();
    visible.sort_by_key(|ad| ad.priority);
    visible
}

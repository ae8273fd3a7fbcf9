//! Geofence membership for ad targeting.
//!
//! Pure functions that decide whether a point falls inside a campaign's
//! circular fence, using great-circle (haversine) distance.

use tracing::info;

use rideadmin_common::{haversine_km, GeoFence, GeoPoint};

/// Absorbs float noise so a point sitting on the fence edge stays inside.
const BOUNDARY_TOLERANCE_KM: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Pure decision functions
// ---------------------------------------------------------------------------

/// Great-circle distance in kilometers. Symmetric in its arguments.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_km(a.lat, a.lng, b.lat, b.lng)
}

/// Inclusive membership check.
///
/// A fence with a non-positive or non-finite radius matches nothing, not even
/// its own center. Non-finite coordinates never match.
pub fn is_within_fence(point: &GeoPoint, fence: &GeoFence) -> bool {
    if !fence.radius_km.is_finite() || fence.radius_km <= 0.0 {
        return false;
    }
    if !is_finite(point) || !is_finite(&fence.center) {
        return false;
    }
    distance_km(point, &fence.center) <= fence.radius_km + BOUNDARY_TOLERANCE_KM
}

fn is_finite(point: &GeoPoint) -> bool {
    point.lat.is_finite() && point.lng.is_finite()
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Counters produced by a batch fence run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FenceFilterStats {
    pub kept: u32,
    pub outside: u32,
    /// Items the locator had no coordinates for
    pub unlocated: u32,
}

/// Keep the items whose location falls inside `fence`, preserving order.
/// Items without a location are dropped.
pub fn fence_filter<T, F>(items: Vec<T>, fence: &GeoFence, locate: F) -> (Vec<T>, FenceFilterStats)
where
    F: Fn(&T) -> Option<GeoPoint>,
{
    let mut stats = FenceFilterStats::default();
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        match locate(&item) {
            Some(point) if is_within_fence(&point, fence) => {
                stats.kept += 1;
                kept.push(item);
            }
            Some(_) => stats.outside += 1,
            None => stats.unlocated += 1,
        }
    }

    info!(
        kept = stats.kept,
        outside = stats.outside,
        unlocated = stats.unlocated,
        radius_km = fence.radius_km,
        "Fence filter complete"
    );
    (kept, stats)
}

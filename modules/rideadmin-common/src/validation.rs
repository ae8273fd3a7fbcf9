//! Form-level checks run before a record is written to the document store.
//!
//! The evaluators never call these. They tolerate bad data and fall back to a
//! safe default; these functions are how the dashboard reports that data.

use rideadmin_world::{CarouselAd, GeoFence, ScheduleWindow};

use crate::error::RideAdminError;

/// An enabled schedule needs both bounds, with end strictly after start.
pub fn validate_schedule(schedule: &ScheduleWindow) -> Result<(), RideAdminError> {
    if !schedule.enabled {
        return Ok(());
    }

    let start = schedule
        .start_date
        .ok_or_else(|| RideAdminError::Validation("start date is required".into()))?;
    let end = schedule
        .end_date
        .ok_or_else(|| RideAdminError::Validation("end date is required".into()))?;

    if end <= start {
        return Err(RideAdminError::Validation(
            "end date must be after start date".into(),
        ));
    }
    Ok(())
}

pub fn validate_fence(fence: &GeoFence) -> Result<(), RideAdminError> {
    if !fence.center.is_valid() {
        return Err(RideAdminError::Validation(format!(
            "geofence center ({}, {}) is out of range",
            fence.center.lat, fence.center.lng
        )));
    }
    if !fence.radius_km.is_finite() || fence.radius_km <= 0.0 {
        return Err(RideAdminError::Validation(
            "geofence radius must be greater than zero".into(),
        ));
    }
    Ok(())
}

pub fn validate_ad(ad: &CarouselAd) -> Result<(), RideAdminError> {
    if ad.title.trim().is_empty() {
        return Err(RideAdminError::Validation("title is required".into()));
    }
    validate_schedule(&ad.schedule)?;
    if let Some(fence) = &ad.geofence {
        validate_fence(fence)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rideadmin_world::GeoPoint;

    fn ad(title: &str, schedule: ScheduleWindow) -> CarouselAd {
        CarouselAd {
            id: "ad-1".to_string(),
            title: title.to_string(),
            description: None,
            category: None,
            ad_type: None,
            image_url: None,
            link_url: None,
            is_active: true,
            schedule,
            status: None,
            geofence: None,
            priority: 0,
            created_at: None,
        }
    }

    fn message(err: RideAdminError) -> String {
        match err {
            RideAdminError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn disabled_schedule_needs_nothing() {
        assert!(validate_schedule(&ScheduleWindow::always()).is_ok());
    }

    #[test]
    fn enabled_schedule_needs_both_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut schedule = ScheduleWindow::between(start, start + Duration::days(1));
        schedule.end_date = None;
        assert_eq!(message(validate_schedule(&schedule).unwrap_err()), "end date is required");

        schedule.start_date = None;
        assert_eq!(message(validate_schedule(&schedule).unwrap_err()), "start date is required");
    }

    #[test]
    fn end_must_follow_start() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let equal = ScheduleWindow::between(start, start);
        let reversed = ScheduleWindow::between(start, start - Duration::hours(1));
        for schedule in [equal, reversed] {
            assert_eq!(
                message(validate_schedule(&schedule).unwrap_err()),
                "end date must be after start date"
            );
        }
    }

    #[test]
    fn title_is_required() {
        let err = validate_ad(&ad("   ", ScheduleWindow::always())).unwrap_err();
        assert_eq!(message(err), "title is required");
        assert!(validate_ad(&ad("Festival rides", ScheduleWindow::always())).is_ok());
    }

    #[test]
    fn fence_checks() {
        let center = GeoPoint::new(27.7172, 85.3240);
        assert!(validate_fence(&GeoFence::new(center, 10.0)).is_ok());
        assert!(validate_fence(&GeoFence::new(center, 0.0)).is_err());
        assert!(validate_fence(&GeoFence::new(center, f64::INFINITY)).is_err());
        assert!(validate_fence(&GeoFence::new(GeoPoint::new(95.0, 0.0), 1.0)).is_err());
    }

    #[test]
    fn ad_with_bad_fence_is_rejected() {
        let mut bad = ad("Airport pickup", ScheduleWindow::always());
        bad.geofence = Some(GeoFence::new(GeoPoint::new(27.7, 85.3), -1.0));
        assert!(validate_ad(&bad).is_err());
    }
}

//! Strict decoding of values exported from the document store.

use serde::de::DeserializeOwned;

use rideadmin_world::AdStatus;

use crate::error::RideAdminError;

/// Parse a status supplied by a person (CLI flag, form value). Unlike
/// [`AdStatus::parse`], an unknown value is an error rather than `None`.
pub fn parse_status(raw: &str) -> Result<AdStatus, RideAdminError> {
    AdStatus::parse(raw).ok_or_else(|| {
        RideAdminError::InvalidStatus(format!(
            "`{raw}` is not one of upcoming, active, expired, inactive"
        ))
    })
}

/// Decode a snapshot: a JSON array of documents.
pub fn decode_snapshot<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, RideAdminError> {
    Ok(serde_json::from_str(raw)?)
}

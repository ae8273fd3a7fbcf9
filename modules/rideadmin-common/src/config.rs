use std::env;

use serde::{Deserialize, Serialize};

use crate::error::RideAdminError;

pub const ENV_INCOMPLETE_SCHEDULE: &str = "RIDEADMIN_INCOMPLETE_SCHEDULE";
pub const ENV_ALL_SENTINEL: &str = "RIDEADMIN_ALL_SENTINEL";

/// Filter value that means "no constraint for this field".
pub const DEFAULT_ALL_SENTINEL: &str = "all";

/// How to read an enabled schedule that is missing one of its bounds.
///
/// This is a product decision, so it is configurable per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompleteSchedulePolicy {
    /// Any missing bound means the schedule is ignored.
    #[default]
    AlwaysActive,
    /// A missing start is "already started", a missing end is "never ends".
    OpenEnded,
}

impl IncompleteSchedulePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "always_active" => Some(Self::AlwaysActive),
            "open_ended" => Some(Self::OpenEnded),
            _ => None,
        }
    }
}

/// Dashboard core configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub incomplete_schedule: IncompleteSchedulePolicy,
    pub all_sentinel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            incomplete_schedule: IncompleteSchedulePolicy::default(),
            all_sentinel: DEFAULT_ALL_SENTINEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment. Unset variables fall
    /// back to their defaults; set-but-invalid ones are an error.
    pub fn from_env() -> Result<Self, RideAdminError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RideAdminError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = non_empty(lookup(ENV_INCOMPLETE_SCHEDULE)) {
            config.incomplete_schedule = IncompleteSchedulePolicy::parse(&raw).ok_or_else(|| {
                RideAdminError::Config(format!(
                    "{ENV_INCOMPLETE_SCHEDULE} must be `always_active` or `open_ended`, got `{raw}`"
                ))
            })?;
        }

        if let Some(raw) = non_empty(lookup(ENV_ALL_SENTINEL)) {
            config.all_sentinel = raw;
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

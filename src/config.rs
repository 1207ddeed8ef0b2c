use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use thiserror::Error;

use crate::model::coordinate::Coordinate;
use crate::model::zone::{DEFAULT_ZONE, GeoZone, ZoneError};
use crate::models::EmployeeId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("invalid zone: {0}")]
    Zone(#[from] ZoneError),
}

/// Settings for the command-line front end. The session core is handed these
/// values and never reads the environment itself.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub access_token: String,
    /// Returned by login next to the token; unset for HR/Admin accounts.
    pub employee_id: Option<EmployeeId>,
    pub zone: GeoZone,
    pub location_timeout: Duration,
    pub http_timeout: Duration,
    pub history_poll_interval: Duration,

    /// Position reported by the fixed-position provider; unset means the
    /// device has no location.
    pub device_position: Option<Coordinate>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let zone = GeoZone::new(
            parse_or(&lookup, "ZONE_LAT_MIN", DEFAULT_ZONE.lat_min())?,
            parse_or(&lookup, "ZONE_LAT_MAX", DEFAULT_ZONE.lat_max())?,
            parse_or(&lookup, "ZONE_LON_MIN", DEFAULT_ZONE.lon_min())?,
            parse_or(&lookup, "ZONE_LON_MAX", DEFAULT_ZONE.lon_max())?,
            lookup("ZONE_LABEL").unwrap_or_else(|| DEFAULT_ZONE.label.clone()),
        )?;

        let device_position = match (lookup("DEVICE_LAT"), lookup("DEVICE_LON")) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(
                parse_value("DEVICE_LAT", &lat)?,
                parse_value("DEVICE_LON", &lon)?,
                parse_or(&lookup, "DEVICE_ACCURACY_M", 0.0)?,
            )),
            _ => None,
        };

        let employee_id = match lookup("EMPLOYEE_ID") {
            Some(raw) => Some(EmployeeId(parse_value("EMPLOYEE_ID", &raw)?)),
            None => None,
        };

        let location_timeout: u64 = parse_or(&lookup, "LOCATION_TIMEOUT_MS", 5000)?;
        let http_timeout: u64 = parse_or(&lookup, "HTTP_TIMEOUT_MS", 10_000)?;
        let history_poll_secs: u64 = parse_or(&lookup, "HISTORY_POLL_SECS", 30)?;

        Ok(Self {
            api_base_url: required("API_BASE_URL")?,
            access_token: required("ACCESS_TOKEN")?,
            employee_id,
            zone,
            location_timeout: Duration::from_millis(location_timeout),
            http_timeout: Duration::from_millis(http_timeout),
            history_poll_interval: Duration::from_secs(history_poll_secs),
            device_position,
        })
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_ZONE_LABEL: &str = "NUST H-12 Islamabad";

/// Office zone used when no bounds are configured.
pub static DEFAULT_ZONE: Lazy<GeoZone> = Lazy::new(|| GeoZone {
    lat_min: 33.60,
    lat_max: 33.70,
    lon_min: 72.95,
    lon_max: 73.25,
    label: DEFAULT_ZONE_LABEL.to_string(),
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("zone bounds must be finite")]
    NonFinite,

    #[error("latitude range is empty: {min} >= {max}")]
    EmptyLatitude { min: f64, max: f64 },

    #[error("longitude range is empty: {min} >= {max}")]
    EmptyLongitude { min: f64, max: f64 },
}

/// Axis-aligned rectangle an employee must stand in to mark attendance.
///
/// Fields are private so `lat_min < lat_max` and `lon_min < lon_max` hold for
/// every value that exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoZone {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
    pub label: String,
}

impl GeoZone {
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
        label: impl Into<String>,
    ) -> Result<Self, ZoneError> {
        if ![lat_min, lat_max, lon_min, lon_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ZoneError::NonFinite);
        }
        if lat_min >= lat_max {
            return Err(ZoneError::EmptyLatitude {
                min: lat_min,
                max: lat_max,
            });
        }
        if lon_min >= lon_max {
            return Err(ZoneError::EmptyLongitude {
                min: lon_min,
                max: lon_max,
            });
        }

        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            label: label.into(),
        })
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }
}

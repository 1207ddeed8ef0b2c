use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One day of attendance as returned by the service. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "AttendanceRecordWire")]
pub struct AttendanceRecord {
    pub id: Option<u64>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_at: NaiveDateTime,
    pub location_name: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub integrity_verified: bool,
}

impl AttendanceRecord {
    pub fn new(date: NaiveDate, status: AttendanceStatus, marked_at: NaiveDateTime) -> Self {
        Self {
            id: None,
            date,
            status,
            marked_at,
            location_name: None,
            coordinate: None,
            integrity_verified: true,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }
}

#[derive(Deserialize)]
struct AttendanceRecordWire {
    #[serde(default)]
    id: Option<u64>,
    date: String,
    status: AttendanceStatus,
    marked_at: String,
    #[serde(default)]
    latitude: Option<WireNumber>,
    #[serde(default)]
    longitude: Option<WireNumber>,
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default = "verified_by_default")]
    integrity_verified: bool,
}

fn verified_by_default() -> bool {
    true
}

/// The service stores coordinates as text; older payloads send numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    fn value(self) -> Result<Option<f64>, String> {
        match self {
            WireNumber::Number(n) => Ok(Some(n)),
            WireNumber::Text(s) if s.trim().is_empty() => Ok(None),
            WireNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("invalid coordinate value {s:?}")),
        }
    }
}

impl TryFrom<AttendanceRecordWire> for AttendanceRecord {
    type Error = String;

    fn try_from(wire: AttendanceRecordWire) -> Result<Self, Self::Error> {
        let latitude = wire.latitude.map(WireNumber::value).transpose()?.flatten();
        let longitude = wire.longitude.map(WireNumber::value).transpose()?.flatten();

        Ok(Self {
            id: wire.id,
            date: parse_calendar_date(&wire.date)?,
            status: wire.status,
            marked_at: parse_timestamp(&wire.marked_at)?,
            location_name: normalize_placeholder(wire.location_name),
            coordinate: match (latitude, longitude) {
                (Some(lat), Some(lon)) => Some(Coordinate::recorded(lat, lon)),
                _ => None,
            },
            integrity_verified: wire.integrity_verified,
        })
    }
}

/// Accepts a bare date or any timestamp whose first ten characters are one.
/// Timestamps with an offset are moved to the local calendar first.
pub(crate) fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Local).date_naive());
    }

    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|e| format!("invalid date {raw:?}: {e}"))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Local).naive_local());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("invalid timestamp {raw:?}"))
}

/// "N/A" is the service's placeholder for a missing value.
pub(crate) fn normalize_placeholder(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.trim().is_empty() && n != "N/A")
}

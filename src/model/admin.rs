use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::model::attendance::{
    normalize_placeholder, parse_calendar_date, parse_timestamp, AttendanceStatus,
};

/// One attendance line in the HR/Admin listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "AdminAttendanceRowWire")]
pub struct AdminAttendanceRow {
    pub date: NaiveDate,
    pub employee_name: String,
    /// Company-issued code such as `EMP-001`; `PENDING` until HR approves.
    pub employee_code: String,
    pub department: Option<String>,
    pub status: AttendanceStatus,
    pub marked_at: Option<NaiveDateTime>,
    pub location_name: Option<String>,
    pub integrity_verified: bool,
}

#[derive(Deserialize)]
struct AdminAttendanceRowWire {
    date: String,
    employee_name: String,
    employee_id: String,
    #[serde(default)]
    department: Option<String>,
    status: AttendanceStatus,
    #[serde(default)]
    marked_at: Option<String>,
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default = "verified_by_default")]
    integrity_verified: bool,
}

fn verified_by_default() -> bool {
    true
}

impl TryFrom<AdminAttendanceRowWire> for AdminAttendanceRow {
    type Error = String;

    fn try_from(wire: AdminAttendanceRowWire) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_calendar_date(&wire.date)?,
            employee_name: wire.employee_name,
            employee_code: wire.employee_id,
            department: normalize_placeholder(wire.department),
            status: wire.status,
            marked_at: wire.marked_at.as_deref().map(parse_timestamp).transpose()?,
            location_name: normalize_placeholder(wire.location_name),
            integrity_verified: wire.integrity_verified,
        })
    }
}

/// Inclusive date window for admin queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }
}

/// Per-employee roll-up built from admin rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub employee_code: String,
    pub employee_name: String,
    pub total_attendance: usize,
    pub present_count: usize,
    pub absent_count: usize,
    /// Percentage rounded to two decimals.
    pub attendance_rate: f64,
    pub last_attendance: Option<NaiveDate>,
    pub tampered_records: usize,
}

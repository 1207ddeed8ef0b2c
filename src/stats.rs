//! Figures shown on the attendance dashboard, computed from the history the
//! service returned. Nothing here depends on the order of the input.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use strum_macros::Display;

use crate::model::admin::{AdminAttendanceRow, EmployeeSummary};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum TodayStatus {
    #[strum(serialize = "present")]
    Present,
    #[strum(serialize = "absent")]
    Absent,
    #[strum(serialize = "Not Marked")]
    NotMarked,
}

impl From<AttendanceStatus> for TodayStatus {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => TodayStatus::Present,
            AttendanceStatus::Absent => TodayStatus::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceStatistics {
    pub today_status: TodayStatus,
    pub total_present: usize,
    /// Whole percent, 0..=100.
    pub attendance_rate: u8,
}

/// Statistics with "today" taken from the local clock.
pub fn derive_statistics(records: &[AttendanceRecord]) -> AttendanceStatistics {
    derive_statistics_on(records, Local::now().date_naive())
}

pub fn derive_statistics_on(
    records: &[AttendanceRecord],
    today: NaiveDate,
) -> AttendanceStatistics {
    let today_status = records
        .iter()
        .find(|r| r.date == today)
        .map(|r| TodayStatus::from(r.status))
        .unwrap_or(TodayStatus::NotMarked);

    let total_present = records.iter().filter(|r| r.is_present()).count();
    let rate = (total_present as f64 * 100.0 / records.len().max(1) as f64).round();

    AttendanceStatistics {
        today_status,
        total_present,
        attendance_rate: rate as u8,
    }
}

/// Newest first, for display.
pub fn sort_by_date_desc(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.marked_at.cmp(&a.marked_at)));
}

/// Rolls admin rows up per employee, ordered by name.
pub fn summarize_by_employee(rows: &[AdminAttendanceRow]) -> Vec<EmployeeSummary> {
    let mut by_code: HashMap<&str, EmployeeSummary> = HashMap::new();

    for row in rows {
        let summary = by_code
            .entry(row.employee_code.as_str())
            .or_insert_with(|| EmployeeSummary {
                employee_code: row.employee_code.clone(),
                employee_name: row.employee_name.clone(),
                total_attendance: 0,
                present_count: 0,
                absent_count: 0,
                attendance_rate: 0.0,
                last_attendance: None,
                tampered_records: 0,
            });

        summary.total_attendance += 1;
        match row.status {
            AttendanceStatus::Present => summary.present_count += 1,
            AttendanceStatus::Absent => summary.absent_count += 1,
        }
        if !row.integrity_verified {
            summary.tampered_records += 1;
        }
        summary.last_attendance = summary.last_attendance.max(Some(row.date));
    }

    let mut summaries: Vec<EmployeeSummary> = by_code
        .into_values()
        .map(|mut s| {
            let rate = s.present_count as f64 * 100.0 / s.total_attendance.max(1) as f64;
            s.attendance_rate = (rate * 100.0).round() / 100.0;
            s
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.employee_name
            .cmp(&b.employee_name)
            .then_with(|| a.employee_code.cmp(&b.employee_code))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
        let marked_at: NaiveDateTime = date.and_hms_opt(9, 0, 0).unwrap();
        AttendanceRecord::new(date, status, marked_at)
    }

    fn row(
        code: &str,
        name: &str,
        date: NaiveDate,
        status: AttendanceStatus,
        verified: bool,
    ) -> AdminAttendanceRow {
        AdminAttendanceRow {
            date,
            employee_name: name.to_string(),
            employee_code: code.to_string(),
            department: None,
            status,
            marked_at: None,
            location_name: None,
            integrity_verified: verified,
        }
    }

    #[test]
    fn empty_history() {
        let stats = derive_statistics_on(&[], day(2026, 10, 17));
        assert_eq!(
            stats,
            AttendanceStatistics {
                today_status: TodayStatus::NotMarked,
                total_present: 0,
                attendance_rate: 0,
            }
        );
    }

    #[test]
    fn today_present_yesterday_absent() {
        let today = day(2026, 10, 17);
        let records = [
            record(today, AttendanceStatus::Present),
            record(today - Duration::days(1), AttendanceStatus::Absent),
        ];

        let stats = derive_statistics_on(&records, today);
        assert_eq!(stats.today_status, TodayStatus::Present);
        assert_eq!(stats.total_present, 1);
        assert_eq!(stats.attendance_rate, 50);
    }

    #[test]
    fn order_does_not_matter() {
        let today = day(2026, 10, 17);
        let mut records = vec![
            record(today - Duration::days(2), AttendanceStatus::Present),
            record(today, AttendanceStatus::Absent),
            record(today - Duration::days(1), AttendanceStatus::Present),
        ];
        let forward = derive_statistics_on(&records, today);
        records.reverse();
        assert_eq!(derive_statistics_on(&records, today), forward);
        assert_eq!(forward.today_status, TodayStatus::Absent);
        assert_eq!(forward.attendance_rate, 67);
    }

    #[test]
    fn stale_history_is_not_marked_today() {
        let today = day(2026, 10, 17);
        let records = [record(today - Duration::days(3), AttendanceStatus::Present)];
        let stats = derive_statistics_on(&records, today);
        assert_eq!(stats.today_status, TodayStatus::NotMarked);
        assert_eq!(stats.attendance_rate, 100);
    }

    #[test]
    fn sorts_newest_first() {
        let mut records = vec![
            record(day(2026, 10, 15), AttendanceStatus::Present),
            record(day(2026, 10, 17), AttendanceStatus::Present),
            record(day(2026, 10, 16), AttendanceStatus::Absent),
        ];
        sort_by_date_desc(&mut records);
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2026, 10, 17), day(2026, 10, 16), day(2026, 10, 15)]);
    }

    #[test]
    fn today_status_labels() {
        assert_eq!(TodayStatus::NotMarked.to_string(), "Not Marked");
        assert_eq!(TodayStatus::Present.to_string(), "present");
    }

    #[test]
    fn summarizes_per_employee() {
        let rows = [
            row("EMP-002", "Bilal", day(2026, 10, 16), AttendanceStatus::Present, true),
            row("EMP-001", "Ayesha", day(2026, 10, 15), AttendanceStatus::Present, true),
            row("EMP-001", "Ayesha", day(2026, 10, 17), AttendanceStatus::Absent, false),
            row("EMP-001", "Ayesha", day(2026, 10, 16), AttendanceStatus::Present, true),
        ];

        let summaries = summarize_by_employee(&rows);
        assert_eq!(summaries.len(), 2);

        let ayesha = &summaries[0];
        assert_eq!(ayesha.employee_code, "EMP-001");
        assert_eq!(ayesha.total_attendance, 3);
        assert_eq!(ayesha.present_count, 2);
        assert_eq!(ayesha.absent_count, 1);
        assert_eq!(ayesha.attendance_rate, 66.67);
        assert_eq!(ayesha.last_attendance, Some(day(2026, 10, 17)));
        assert_eq!(ayesha.tampered_records, 1);

        assert_eq!(summaries[1].attendance_rate, 100.0);
    }
}

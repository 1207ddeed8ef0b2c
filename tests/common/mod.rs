#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use jsonwebtoken::{EncodingKey, Header, encode};
use tokio::sync::Notify;

use hrm_attendance::api::AttendanceService;
use hrm_attendance::auth::auth::CredentialSource;
use hrm_attendance::geolocation::{GeolocationProvider, PositionOptions};
use hrm_attendance::model::admin::{AdminAttendanceRow, DateRange};
use hrm_attendance::model::attendance::{AttendanceRecord, AttendanceStatus};
use hrm_attendance::model::coordinate::Coordinate;
use hrm_attendance::models::{Claims, EmployeeId, MarkAttendanceReq, MarkReceipt};
use hrm_attendance::{LocationError, RemoteError};

pub const EMPLOYEE: &str = "employee";
pub const HR: &str = "hr";

/// Signs `{sub, role, exp}` the way the backend's login does.
pub fn issue_token(role: &str, ttl_secs: i64) -> String {
    let claims = Claims {
        sub: "ayesha@example.com".to_string(),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .unwrap()
}

pub fn office() -> Coordinate {
    Coordinate::new(33.643, 73.184, 15.0)
}

pub fn south_of_office() -> Coordinate {
    Coordinate::new(33.50, 73.184, 15.0)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn record(days_ago: i64, status: AttendanceStatus) -> AttendanceRecord {
    let date = today() - Duration::days(days_ago);
    AttendanceRecord::new(date, status, date.and_hms_opt(9, 0, 0).unwrap())
}

/// Credential collaborator that counts re-authentication requests.
pub struct TestCredentials {
    token: Mutex<Option<String>>,
    employee_id: Option<EmployeeId>,
    pub reauth_calls: AtomicUsize,
}

impl TestCredentials {
    pub fn new(token: String, employee_id: Option<u64>) -> Self {
        Self {
            token: Mutex::new(Some(token)),
            employee_id: employee_id.map(EmployeeId),
            reauth_calls: AtomicUsize::new(0),
        }
    }

    pub fn employee() -> Self {
        Self::new(issue_token(EMPLOYEE, 900), Some(42))
    }

    pub fn hr() -> Self {
        Self::new(issue_token(HR, 900), None)
    }

    pub fn reauth_count(&self) -> usize {
        self.reauth_calls.load(Ordering::SeqCst)
    }
}

impl CredentialSource for TestCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn employee_id(&self) -> Option<EmployeeId> {
        self.employee_id
    }

    fn reauthenticate(&self) {
        self.reauth_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub enum ProviderBehavior {
    Fix(Coordinate),
    Fail(LocationError),
    Hang,
    Gated(Coordinate),
}

pub struct FakeProvider {
    behavior: Mutex<ProviderBehavior>,
    pub calls: AtomicUsize,
    pub last_options: Mutex<Option<PositionOptions>>,
    pub entered: Notify,
    pub gate: Notify,
}

impl FakeProvider {
    pub fn new(behavior: ProviderBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    pub fn at(position: Coordinate) -> Self {
        Self::new(ProviderBehavior::Fix(position))
    }

    pub fn set(&self, behavior: ProviderBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }
}

#[async_trait]
impl GeolocationProvider for FakeProvider {
    async fn request_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        self.entered.notify_one();

        let gated = match &*self.behavior.lock().unwrap() {
            ProviderBehavior::Fix(c) => return Ok(*c),
            ProviderBehavior::Fail(e) => return Err(e.clone()),
            ProviderBehavior::Hang => None,
            ProviderBehavior::Gated(c) => Some(*c),
        };

        match gated {
            Some(c) => {
                self.gate.notified().await;
                Ok(c)
            }
            None => std::future::pending().await,
        }
    }
}

/// In-memory attendance backend with scripted answers.
pub struct FakeService {
    mark_results: Mutex<VecDeque<Result<MarkReceipt, RemoteError>>>,
    history: Mutex<Result<Vec<AttendanceRecord>, RemoteError>>,
    admin_rows: Mutex<Vec<AdminAttendanceRow>>,
    gate_marks: Mutex<bool>,
    pub mark_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub admin_calls: AtomicUsize,
    pub last_mark: Mutex<Option<MarkAttendanceReq>>,
    pub entered: Notify,
    pub gate: Notify,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            mark_results: Mutex::new(VecDeque::new()),
            history: Mutex::new(Ok(Vec::new())),
            admin_rows: Mutex::new(Vec::new()),
            gate_marks: Mutex::new(false),
            mark_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            admin_calls: AtomicUsize::new(0),
            last_mark: Mutex::new(None),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    pub fn push_mark(&self, result: Result<MarkReceipt, RemoteError>) {
        self.mark_results.lock().unwrap().push_back(result);
    }

    pub fn set_history(&self, result: Result<Vec<AttendanceRecord>, RemoteError>) {
        *self.history.lock().unwrap() = result;
    }

    pub fn set_admin_rows(&self, rows: Vec<AdminAttendanceRow>) {
        *self.admin_rows.lock().unwrap() = rows;
    }

    /// Holds every mark request until `gate` is notified.
    pub fn gate_marks(&self) {
        *self.gate_marks.lock().unwrap() = true;
    }

    pub fn marks(&self) -> usize {
        self.mark_calls.load(Ordering::SeqCst)
    }

    pub fn histories(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

pub fn receipt() -> MarkReceipt {
    MarkReceipt {
        message: "Attendance marked successfully".to_string(),
    }
}

#[async_trait]
impl AttendanceService for FakeService {
    async fn mark_attendance(&self, req: &MarkAttendanceReq) -> Result<MarkReceipt, RemoteError> {
        self.mark_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mark.lock().unwrap() = Some(req.clone());
        self.entered.notify_one();

        let gated = *self.gate_marks.lock().unwrap();
        if gated {
            self.gate.notified().await;
        }

        let result = self.mark_results.lock().unwrap().pop_front();
        match result {
            Some(r) => r,
            None => Ok(receipt()),
        }
    }

    async fn attendance_history(
        &self,
        _employee_id: EmployeeId,
    ) -> Result<Vec<AttendanceRecord>, RemoteError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history.lock().unwrap().clone()
    }

    async fn all_attendance(
        &self,
        _range: DateRange,
    ) -> Result<Vec<AdminAttendanceRow>, RemoteError> {
        self.admin_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.admin_rows.lock().unwrap().clone())
    }
}

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

/// Body of `POST /api/employee/mark-attendance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkAttendanceReq {
    pub employee_id: EmployeeId,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
}

/// Success body of the mark endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkReceipt {
    pub message: String,
}

/// Machine-readable failure code; newer backends send it next to `detail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCode {
    AlreadyMarked,
    OutOfZone,
    Unauthorized,
    ServerError,
    /// A code this client does not know; status and detail decide.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<RemoteCode>,
}

/// Access-token claims as the attendance backend mints them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// "employee", "hr" or "admin"
    pub role: String,
    pub exp: usize,
}

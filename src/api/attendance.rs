use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use crate::api::AttendanceService;
use crate::auth::auth::CredentialSource;
use crate::error::RemoteError;
use crate::model::admin::{AdminAttendanceRow, DateRange};
use crate::model::attendance::AttendanceRecord;
use crate::models::{EmployeeId, ErrorBody, MarkAttendanceReq, MarkReceipt, RemoteCode};

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Attendance backend reached over HTTP with a bearer token.
pub struct HttpAttendanceService {
    base_url: String,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
}

impl HttpAttendanceService {
    /// `timeout` bounds every request end to end.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, RemoteError> {
        self.credentials
            .bearer_token()
            .map(|t| format!("Bearer {t}"))
            .ok_or_else(|| RemoteError::Unauthorized("Missing token".to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, self.bearer()?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Transport(format!("Request timed out: {e}"))
                } else {
                    RemoteError::Transport(format!("Failed to reach attendance service: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let error_body = serde_json::from_slice::<ErrorBody>(&body).unwrap_or_default();
            let err = classify(status.as_u16(), error_body);
            warn!(status = status.as_u16(), error = %err, "Attendance service rejected request");
            return Err(err);
        }

        serde_json::from_slice::<T>(&body).map_err(|e| {
            error!(error = %e, "Undecodable attendance service response");
            RemoteError::Malformed(e.to_string())
        })
    }
}

/// Maps a non-success response to a remote condition. An explicit `code`
/// wins; otherwise status and detail text decide.
pub(crate) fn classify(status: u16, body: ErrorBody) -> RemoteError {
    let detail = body.detail.unwrap_or_else(|| format!("HTTP {status}"));

    match body.code {
        Some(RemoteCode::AlreadyMarked) => return RemoteError::AlreadyMarked,
        Some(RemoteCode::OutOfZone) => return RemoteError::OutOfZone(detail),
        Some(RemoteCode::Unauthorized) => return RemoteError::Unauthorized(detail),
        Some(RemoteCode::ServerError) => return RemoteError::ServerError { status, detail },
        Some(RemoteCode::Unknown) | None => {}
    }

    let lowered = detail.to_lowercase();
    match status {
        401 | 403 => RemoteError::Unauthorized(detail),
        409 => RemoteError::AlreadyMarked,
        400 if lowered.contains("already marked") => RemoteError::AlreadyMarked,
        400 if lowered.contains("location") => RemoteError::OutOfZone(detail),
        _ => RemoteError::ServerError { status, detail },
    }
}

#[async_trait]
impl AttendanceService for HttpAttendanceService {
    #[instrument(
        name = "remote_mark_attendance",
        skip(self, req),
        fields(employee_id = %req.employee_id)
    )]
    async fn mark_attendance(&self, req: &MarkAttendanceReq) -> Result<MarkReceipt, RemoteError> {
        debug!("Posting mark-attendance");

        self.send(
            self.client
                .post(self.url("/api/employee/mark-attendance"))
                .json(req),
        )
        .await
    }

    #[instrument(name = "remote_attendance_history", skip(self))]
    async fn attendance_history(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<AttendanceRecord>, RemoteError> {
        debug!("Fetching attendance history");

        self.send(self.client.get(self.url(&format!(
            "/api/employee/my-attendance?employee_id={employee_id}"
        ))))
        .await
    }

    #[instrument(name = "remote_all_attendance", skip(self))]
    async fn all_attendance(
        &self,
        range: DateRange,
    ) -> Result<Vec<AdminAttendanceRow>, RemoteError> {
        debug!("Fetching all attendance");

        self.send(self.client.get(self.url(&format!(
            "/api/admin/all-attendance?start_date={}&end_date={}",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        ))))
        .await
    }
}

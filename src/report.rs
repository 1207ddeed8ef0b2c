use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::api::AttendanceService;
use crate::auth::auth::{AuthUser, CredentialSource};
use crate::error::{AttendanceError, RemoteError};
use crate::model::admin::{AdminAttendanceRow, DateRange, EmployeeSummary};
use crate::stats::summarize_by_employee;

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceReport {
    pub range: DateRange,
    pub rows: Vec<AdminAttendanceRow>,
    pub summaries: Vec<EmployeeSummary>,
}

/// HR/Admin view over every employee's attendance.
pub struct AdminAttendanceView {
    service: Arc<dyn AttendanceService>,
    credentials: Arc<dyn CredentialSource>,
}

impl AdminAttendanceView {
    pub fn new(
        service: Arc<dyn AttendanceService>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            service,
            credentials,
        }
    }

    /// The role in the token claims gates the request locally; callers
    /// without HR/Admin never reach the network.
    #[instrument(name = "attendance_report", skip(self))]
    pub async fn load(&self, range: DateRange) -> Result<AttendanceReport, AttendanceError> {
        let user = AuthUser::from_credentials(self.credentials.as_ref())?;
        user.require_hr_or_admin()?;

        let rows = match self.service.all_attendance(range).await {
            Ok(rows) => rows,
            Err(RemoteError::Unauthorized(detail)) => {
                warn!(detail = %detail, "Service rejected credential");
                self.credentials.reauthenticate();
                return Err(AttendanceError::Unauthorized);
            }
            Err(RemoteError::Malformed(detail)) => {
                return Err(AttendanceError::MalformedResponse(detail));
            }
            Err(e) => return Err(AttendanceError::HistoryUnavailable(e)),
        };

        let summaries = summarize_by_employee(&rows);
        info!(
            rows = rows.len(),
            employees = summaries.len(),
            user = %user.username,
            "Attendance report loaded"
        );

        Ok(AttendanceReport {
            range,
            rows,
            summaries,
        })
    }
}

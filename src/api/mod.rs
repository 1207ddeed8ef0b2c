use async_trait::async_trait;

use crate::error::RemoteError;
use crate::model::admin::{AdminAttendanceRow, DateRange};
use crate::model::attendance::AttendanceRecord;
use crate::models::{EmployeeId, MarkAttendanceReq, MarkReceipt};

pub mod attendance;

/// Remote attendance backend. The server alone enforces one record per
/// employee per day.
#[async_trait]
pub trait AttendanceService: Send + Sync {
    async fn mark_attendance(&self, req: &MarkAttendanceReq) -> Result<MarkReceipt, RemoteError>;

    /// Records in whatever order the service returns them.
    async fn attendance_history(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<AttendanceRecord>, RemoteError>;

    async fn all_attendance(&self, range: DateRange)
        -> Result<Vec<AdminAttendanceRow>, RemoteError>;
}

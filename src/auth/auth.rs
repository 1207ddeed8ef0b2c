use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::auth::jwt::{is_expired, read_claims};
use crate::error::AttendanceError;
use crate::model::role::Role;
use crate::models::EmployeeId;

/// External authentication collaborator.
///
/// Owns the bearer token and the re-authentication flow; the attendance core
/// only reads the token and reports rejection.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;

    /// Employee record linked to the login; the backend returns it next to
    /// the token, not inside it. `None` for HR/Admin accounts.
    fn employee_id(&self) -> Option<EmployeeId>;

    /// Called whenever the token is missing, expired or rejected by the server.
    fn reauthenticate(&self);
}

/// Holds a token obtained elsewhere (login page, environment).
pub struct StaticCredentials {
    token: Mutex<Option<String>>,
    employee_id: Option<EmployeeId>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
            employee_id: None,
        }
    }

    pub fn with_employee_id(mut self, employee_id: Option<EmployeeId>) -> Self {
        self.employee_id = employee_id;
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn employee_id(&self) -> Option<EmployeeId> {
        self.employee_id
    }

    fn reauthenticate(&self) {
        warn!("Credential rejected, discarding token; log in again");
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<EmployeeId>,
}

impl AuthUser {
    /// Resolves the caller from the credential collaborator's current token.
    ///
    /// Missing, unreadable or expired tokens and unknown roles are
    /// `Unauthorized`, and the collaborator is told to re-authenticate.
    pub fn from_credentials(credentials: &dyn CredentialSource) -> Result<Self, AttendanceError> {
        let reject = |reason: &str| {
            warn!(reason, "Rejecting local credential");
            credentials.reauthenticate();
            AttendanceError::Unauthorized
        };

        let token = match credentials.bearer_token() {
            Some(t) => t,
            None => return Err(reject("missing token")),
        };

        let claims = match read_claims(&token) {
            Ok(c) => c,
            Err(_) => return Err(reject("unreadable token")),
        };

        if is_expired(&claims) {
            return Err(reject("expired token"));
        }

        let role = match claims.role.parse::<Role>() {
            Ok(r) => r,
            Err(_) => return Err(reject("invalid role")),
        };

        Ok(AuthUser {
            username: claims.sub,
            role,
            employee_id: credentials.employee_id(),
        })
    }

    pub fn require_employee(&self) -> Result<EmployeeId, AttendanceError> {
        self.employee_id
            .ok_or(AttendanceError::Forbidden("No employee profile"))
    }

    /// Local convenience gate; the server still decides.
    pub fn require_hr_or_admin(&self) -> Result<(), AttendanceError> {
        if self.role.sees_all_attendance() {
            Ok(())
        } else {
            Err(AttendanceError::Forbidden("HR/Admin only"))
        }
    }
}

//! Outcome conditions reported by the attendance session.
//!
//! Every expected condition is recoverable and surfaces as a distinct variant so
//! callers can pick the user-facing message. `MalformedResponse` is the only
//! defect: the service answered with something that does not decode.

use thiserror::Error;

use crate::model::{coordinate::Coordinate, zone::GeoZone};

/// Failure reported by a geolocation provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("timed out waiting for a position")]
    Timeout,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by the remote attendance service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("attendance already marked for today")]
    AlreadyMarked,

    #[error("location rejected by server: {0}")]
    OutOfZone(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server error ({status}): {detail}")]
    ServerError { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttendanceError {
    #[error("location unavailable: {0}")]
    LocationUnavailable(LocationError),

    #[error("enable location before marking attendance")]
    LocationRequired,

    #[error("a location request is already pending")]
    LocationPending,

    #[error("({}, {}) is outside {}", .coordinate.latitude, .coordinate.longitude, .zone.label)]
    OutsideZone { coordinate: Coordinate, zone: GeoZone },

    #[error("an attendance submission is already in progress")]
    SubmissionInProgress,

    #[error("failed to mark attendance: {0}")]
    SubmissionFailed(RemoteError),

    #[error("attendance history unavailable: {0}")]
    HistoryUnavailable(RemoteError),

    #[error("credential missing, expired or rejected")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("session closed before the operation completed")]
    SessionClosed,

    #[error("malformed response from attendance service: {0}")]
    MalformedResponse(String),
}

impl AttendanceError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AttendanceError::MalformedResponse(_))
    }
}

impl From<LocationError> for AttendanceError {
    fn from(e: LocationError) -> Self {
        AttendanceError::LocationUnavailable(e)
    }
}

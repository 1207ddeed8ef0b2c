use serde::Serialize;
use strum_macros::Display;

use crate::error::AttendanceError;
use crate::model::attendance::AttendanceRecord;
use crate::model::coordinate::Coordinate;

/// Where the current mark-attendance attempt stands.
///
/// `Idle -> LocationPending -> (LocationDenied | LocationReady)`,
/// `LocationReady -> Validating -> (RejectedOutsideZone | Submitting)`,
/// `Submitting -> (Marked | AlreadyMarked | SubmissionFailed)`.
/// A new attempt starts over from `acquire_location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AttemptPhase {
    #[default]
    Idle,
    LocationPending,
    LocationDenied,
    LocationReady,
    Validating,
    RejectedOutsideZone,
    Submitting,
    Marked,
    AlreadyMarked,
    SubmissionFailed,
}

impl AttemptPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptPhase::LocationDenied
                | AttemptPhase::RejectedOutsideZone
                | AttemptPhase::Marked
                | AttemptPhase::AlreadyMarked
                | AttemptPhase::SubmissionFailed
        )
    }
}

/// In-memory state of one page session. Never persisted.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub coordinate: Option<Coordinate>,
    pub permission_granted: bool,
    pub location_pending: bool,
    pub submission_in_flight: bool,
    pub phase: AttemptPhase,
    pub history: Option<Vec<AttendanceRecord>>,
    /// Bumped on teardown; results started under an older value are dropped.
    pub generation: u64,
    pub closed: bool,
}

impl SessionState {
    pub fn ensure_open(&self) -> Result<u64, AttendanceError> {
        if self.closed {
            Err(AttendanceError::SessionClosed)
        } else {
            Ok(self.generation)
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        !self.closed && self.generation == generation
    }

    pub fn reset_for_teardown(&mut self) {
        *self = SessionState {
            generation: self.generation + 1,
            closed: true,
            ..SessionState::default()
        };
    }
}

/// Read-only copy of the session state for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub coordinate: Option<Coordinate>,
    pub permission_granted: bool,
    pub submission_in_flight: bool,
    pub phase: AttemptPhase,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            coordinate: state.coordinate,
            permission_granted: state.permission_granted,
            submission_in_flight: state.submission_in_flight,
            phase: state.phase,
        }
    }
}

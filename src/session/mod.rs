use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::api::AttendanceService;
use crate::auth::auth::{AuthUser, CredentialSource};
use crate::error::{AttendanceError, LocationError, RemoteError};
use crate::geofence::is_inside;
use crate::geolocation::{GeolocationProvider, PositionOptions};
use crate::model::attendance::AttendanceRecord;
use crate::model::coordinate::Coordinate;
use crate::model::zone::GeoZone;
use crate::models::{EmployeeId, MarkAttendanceReq, MarkReceipt};
use crate::stats::{AttendanceStatistics, derive_statistics, sort_by_date_desc};

pub mod poller;
pub mod state;

use state::{AttemptPhase, SessionSnapshot, SessionState};

#[derive(Debug, Clone, PartialEq)]
pub enum MarkOutcome {
    Marked(MarkReceipt),
    /// Today already has a record; the attempt converged on it.
    AlreadyMarked,
}

/// One employee's attendance page: location, geofence check, submission and
/// the cached history behind the dashboard figures.
pub struct AttendanceSession {
    session_id: Uuid,
    zone: GeoZone,
    location_options: PositionOptions,
    provider: Arc<dyn GeolocationProvider>,
    service: Arc<dyn AttendanceService>,
    credentials: Arc<dyn CredentialSource>,
    state: Mutex<SessionState>,
}

/// Clears `submission_in_flight` when the submission ends, however it ends.
struct InFlight<'a> {
    session: &'a AttendanceSession,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.session.state();
        if state.is_current(self.generation) {
            state.submission_in_flight = false;
        }
    }
}

/// Clears `location_pending` likewise.
struct LocationRequest<'a> {
    session: &'a AttendanceSession,
    generation: u64,
}

impl Drop for LocationRequest<'_> {
    fn drop(&mut self) {
        let mut state = self.session.state();
        if state.is_current(self.generation) {
            state.location_pending = false;
        }
    }
}

impl AttendanceSession {
    pub fn new(
        zone: GeoZone,
        provider: Arc<dyn GeolocationProvider>,
        service: Arc<dyn AttendanceService>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            zone,
            location_options: PositionOptions::default(),
            provider,
            service,
            credentials,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_location_options(mut self, options: PositionOptions) -> Self {
        self.location_options = options;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn zone(&self) -> &GeoZone {
        &self.zone
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.state())
    }

    pub fn phase(&self) -> AttemptPhase {
        self.state().phase
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Cached history, newest first. `None` until the first successful refresh.
    pub fn history(&self) -> Option<Vec<AttendanceRecord>> {
        let mut records = self.state().history.clone()?;
        sort_by_date_desc(&mut records);
        Some(records)
    }

    /// Dashboard figures over the cached history (empty if never loaded).
    pub fn statistics(&self) -> AttendanceStatistics {
        let state = self.state();
        derive_statistics(state.history.as_deref().unwrap_or_default())
    }

    /// Ends the session. Results of requests still outstanding are discarded
    /// when they arrive.
    pub fn teardown(&self) {
        self.state().reset_for_teardown();
        info!(session_id = %self.session_id, "Attendance session torn down");
    }

    /// Requests one fresh position fix. Starts a new attempt.
    #[instrument(name = "acquire_location", skip(self), fields(session_id = %self.session_id))]
    pub async fn acquire_location(&self) -> Result<Coordinate, AttendanceError> {
        let generation = {
            let mut state = self.state();
            let generation = state.ensure_open()?;
            if state.submission_in_flight {
                return Err(AttendanceError::SubmissionInProgress);
            }
            if state.location_pending {
                return Err(AttendanceError::LocationPending);
            }
            state.location_pending = true;
            state.coordinate = None;
            state.permission_granted = false;
            state.phase = AttemptPhase::LocationPending;
            generation
        };
        let _pending = LocationRequest {
            session: self,
            generation,
        };

        debug!("Requesting position");

        let options = self.location_options;
        let request = self.provider.request_position(options);
        let result = match tokio::time::timeout(options.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };

        let mut state = self.state();
        if !state.is_current(generation) {
            debug!("Discarding position that arrived after teardown");
            return Err(AttendanceError::SessionClosed);
        }
        state.location_pending = false;

        match result {
            Ok(coordinate) => {
                state.coordinate = Some(coordinate);
                state.permission_granted = true;
                state.phase = AttemptPhase::LocationReady;
                info!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    accuracy_m = coordinate.accuracy_meters,
                    "Location acquired"
                );
                Ok(coordinate)
            }
            Err(e) => {
                state.coordinate = None;
                state.permission_granted = false;
                state.phase = AttemptPhase::LocationDenied;
                warn!(error = %e, "Location unavailable");
                Err(AttendanceError::LocationUnavailable(e))
            }
        }
    }

    /// Validates the held coordinate against the zone and submits today's mark.
    ///
    /// Needs a position from `acquire_location` taken since the last attempt.
    /// A call made while another submission is outstanding fails at once with
    /// `SubmissionInProgress`. Nothing is sent outside the zone, nor when the
    /// cached history already has today's record.
    #[instrument(name = "mark_attendance", skip(self), fields(session_id = %self.session_id))]
    pub async fn mark_attendance(&self) -> Result<MarkOutcome, AttendanceError> {
        let (req, coordinate, generation) = {
            let mut state = self.state();
            let generation = state.ensure_open()?;

            if state.submission_in_flight {
                debug!("Rejecting overlapping submission");
                return Err(AttendanceError::SubmissionInProgress);
            }

            // Each attempt consumes one fresh fix.
            let coordinate = match (state.phase, state.permission_granted, state.coordinate) {
                (AttemptPhase::LocationReady, true, Some(c)) => c,
                _ => return Err(AttendanceError::LocationRequired),
            };

            state.phase = AttemptPhase::Validating;
            if !is_inside(&coordinate, &self.zone) {
                state.phase = AttemptPhase::RejectedOutsideZone;
                info!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    zone = %self.zone.label,
                    "Coordinate outside zone, not submitting"
                );
                return Err(AttendanceError::OutsideZone {
                    coordinate,
                    zone: self.zone.clone(),
                });
            }

            // Optimistic; the service still rejects duplicates from other devices.
            let today = Local::now().date_naive();
            let cached_today = state
                .history
                .as_deref()
                .is_some_and(|records| records.iter().any(|r| r.date == today));
            if cached_today {
                state.phase = AttemptPhase::AlreadyMarked;
                info!(%today, "Today's record already cached, not submitting");
                return Ok(MarkOutcome::AlreadyMarked);
            }

            let employee_id = match self.employee_id() {
                Ok(id) => id,
                Err(e) => {
                    state.phase = AttemptPhase::SubmissionFailed;
                    return Err(e);
                }
            };

            state.submission_in_flight = true;
            state.phase = AttemptPhase::Submitting;

            let req = MarkAttendanceReq {
                employee_id,
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
                location_name: self.zone.label.clone(),
            };
            (req, coordinate, generation)
        };
        let in_flight = InFlight {
            session: self,
            generation,
        };

        info!(employee_id = %req.employee_id, "Submitting attendance");
        let result = self.service.mark_attendance(&req).await;
        drop(in_flight);

        let outcome = {
            let mut state = self.state();
            if !state.is_current(generation) {
                debug!("Discarding submission result that arrived after teardown");
                return Err(AttendanceError::SessionClosed);
            }

            let (phase, outcome) = match result {
                Ok(receipt) => (AttemptPhase::Marked, Ok(MarkOutcome::Marked(receipt))),
                Err(RemoteError::AlreadyMarked) => {
                    (AttemptPhase::AlreadyMarked, Ok(MarkOutcome::AlreadyMarked))
                }
                Err(RemoteError::OutOfZone(detail)) => {
                    warn!(detail = %detail, "Service rejected the location");
                    (
                        AttemptPhase::RejectedOutsideZone,
                        Err(AttendanceError::OutsideZone {
                            coordinate,
                            zone: self.zone.clone(),
                        }),
                    )
                }
                Err(e) => (
                    AttemptPhase::SubmissionFailed,
                    Err(self.remote_failure(e, AttendanceError::SubmissionFailed)),
                ),
            };
            state.phase = phase;
            outcome
        };

        match &outcome {
            Ok(MarkOutcome::Marked(_)) => info!("Attendance marked"),
            Ok(MarkOutcome::AlreadyMarked) => info!("Attendance already marked for today"),
            Err(e) => warn!(error = %e, "Attendance submission failed"),
        }

        if outcome.is_ok() {
            if let Err(e) = self.refresh_history().await {
                warn!(error = %e, "History refresh after marking failed");
            }
        }

        outcome
    }

    /// Replaces the cached history with the service's current list. On failure
    /// the previous cache is kept whole.
    #[instrument(name = "refresh_history", skip(self), fields(session_id = %self.session_id))]
    pub async fn refresh_history(&self) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let generation = self.state().ensure_open()?;
        let employee_id = self.employee_id()?;

        let result = self.service.attendance_history(employee_id).await;

        let mut state = self.state();
        if !state.is_current(generation) {
            debug!("Discarding history that arrived after teardown");
            return Err(AttendanceError::SessionClosed);
        }

        match result {
            Ok(records) => {
                debug!(count = records.len(), "History refreshed");
                state.history = Some(records.clone());
                Ok(records)
            }
            Err(e) => Err(self.remote_failure(e, AttendanceError::HistoryUnavailable)),
        }
    }

    fn employee_id(&self) -> Result<EmployeeId, AttendanceError> {
        AuthUser::from_credentials(self.credentials.as_ref())?.require_employee()
    }

    /// Unauthorized goes to the credential collaborator; malformed payloads are
    /// defects; everything else is wrapped as the caller's condition.
    fn remote_failure(
        &self,
        err: RemoteError,
        wrap: fn(RemoteError) -> AttendanceError,
    ) -> AttendanceError {
        match err {
            RemoteError::Unauthorized(detail) => {
                warn!(detail = %detail, "Service rejected credential");
                self.credentials.reauthenticate();
                AttendanceError::Unauthorized
            }
            RemoteError::Malformed(detail) => AttendanceError::MalformedResponse(detail),
            other => wrap(other),
        }
    }
}

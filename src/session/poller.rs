use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::AttendanceError;
use crate::session::AttendanceSession;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Refreshes the session's history right away and then every `every`, until
/// the session is torn down.
pub fn spawn_history_poller(session: Arc<AttendanceSession>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if session.is_closed() {
                break;
            }

            match session.refresh_history().await {
                Ok(records) => debug!(count = records.len(), "Polled attendance history"),
                Err(AttendanceError::SessionClosed) => break,
                Err(e) => warn!(error = %e, "Polling attendance history failed"),
            }
        }

        debug!(session_id = %session.session_id(), "History poller stopped");
    })
}

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod geofence;
pub mod geolocation;
pub mod model;
pub mod models;
pub mod report;
pub mod session;
pub mod stats;

pub use error::{AttendanceError, LocationError, RemoteError};
pub use geofence::is_inside;
pub use session::{AttendanceSession, MarkOutcome};

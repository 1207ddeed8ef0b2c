use std::time::Duration;

use async_trait::async_trait;

use crate::error::LocationError;
use crate::model::coordinate::Coordinate;

pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    /// Oldest cached sample the provider may return; zero forces a fresh fix.
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOCATION_TIMEOUT,
            maximum_age: Duration::ZERO,
            high_accuracy: false,
        }
    }
}

/// Single-shot source of the device position.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn request_position(&self, options: PositionOptions) -> Result<Coordinate, LocationError>;
}

/// Provider for fixed devices (kiosks, the command line) whose position is
/// configured rather than sensed. `None` behaves like a denied permission.
pub struct FixedPositionProvider {
    position: Option<Coordinate>,
}

impl FixedPositionProvider {
    pub fn new(position: Coordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn denied() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl GeolocationProvider for FixedPositionProvider {
    async fn request_position(
        &self,
        _options: PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        self.position.ok_or(LocationError::PermissionDenied)
    }
}

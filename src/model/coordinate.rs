use serde::{Deserialize, Serialize};

/// One position sample. Accuracy is informational and never gates validity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_meters: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
        }
    }

    /// A coordinate read back from the service, which does not keep accuracy.
    pub fn recorded(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, 0.0)
    }
}

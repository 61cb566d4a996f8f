//! Device position fix

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single position fix from the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in metres, when the sensor reports it
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// `lat,lng` as expected by reverse-geocode endpoints
    pub fn latlng(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

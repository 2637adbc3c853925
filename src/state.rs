//! Filter state representation
//!
//! A filter is either waiting for its first measurement or tracking:
//! - latitude/longitude: current best position
//! - variance: estimate error variance shared by both axes
//! - last_update: epoch seconds of the last time-advancing measurement

use crate::measurement::{Estimate, Measurement};

/// Tracking state of an initialized filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackState {
    /// Latitude estimate
    pub latitude: f64,
    /// Longitude estimate
    pub longitude: f64,
    /// Estimate error variance, never negative
    pub variance: f64,
    /// Epoch seconds of the last accepted time step
    pub last_update: u64,
}

impl TrackState {
    /// Seed a track from a measurement, using its raw accuracy as the
    /// initial standard deviation.
    pub fn from_measurement(m: &Measurement) -> Self {
        Self {
            latitude: m.latitude,
            longitude: m.longitude,
            variance: m.accuracy * m.accuracy,
            last_update: m.timestamp,
        }
    }

    pub fn estimate(&self) -> Estimate {
        Estimate::new(self.latitude, self.longitude)
    }
}

/// State of the adaptive axis filter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FilterState {
    #[default]
    Uninitialized,
    Ready(TrackState),
}

impl FilterState {
    pub fn is_ready(&self) -> bool {
        matches!(self, FilterState::Ready(_))
    }

    pub fn track(&self) -> Option<&TrackState> {
        match self {
            FilterState::Uninitialized => None,
            FilterState::Ready(track) => Some(track),
        }
    }
}

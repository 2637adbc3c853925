//! Measurement and estimate records
//!
//! A `Measurement` is one raw GPS fix as reported by the sensor; an
//! `Estimate` is the filtered position the filter produces for it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Floor applied to reported accuracy before it enters the gain.
pub const MIN_ACCURACY: f64 = 1.0;

/// Recorder timestamp layout, interpreted as UTC.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single GPS fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Reported horizontal accuracy radius
    pub accuracy: f64,
    /// Epoch seconds
    pub timestamp: u64,
}

impl Measurement {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp: u64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
        }
    }

    /// Accuracy with the `MIN_ACCURACY` floor applied.
    pub fn clamped_accuracy(&self) -> f64 {
        self.accuracy.max(MIN_ACCURACY)
    }

    pub fn position(&self) -> Estimate {
        Estimate::new(self.latitude, self.longitude)
    }
}

/// Filtered position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Estimate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Parse a recorder timestamp into epoch seconds.
///
/// Accepts either `YYYY-MM-DD HH:MM:SS` (UTC) or a bare integer epoch.
pub fn parse_timestamp(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let invalid = |reason: String| FilterError::InvalidTimestamp {
        input: input.to_string(),
        reason,
    };

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<u64>().map_err(|e| invalid(e.to_string()));
    }

    let parsed =
        NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).map_err(|e| invalid(e.to_string()))?;
    let seconds = parsed.and_utc().timestamp();
    u64::try_from(seconds).map_err(|_| invalid("timestamp precedes the unix epoch".to_string()))
}

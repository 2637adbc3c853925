//! Filter parameters
//!
//! Parameters for the adaptive axis filter

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Parameters for the adaptive axis filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Assumed (average or upper-bound) travel speed driving process noise
    pub assumed_speed: f64,
}

impl FilterParams {
    /// Create new filter parameters
    pub fn new(assumed_speed: f64) -> Self {
        Self { assumed_speed }
    }

    /// Create default parameters suitable for pedestrian tracks
    pub fn default_params() -> Self {
        Self { assumed_speed: 3.0 }
    }

    /// Derive the assumed speed as the mean of per-sample speed readings.
    pub fn from_average_speed(speeds: &[f64]) -> Result<Self> {
        if speeds.is_empty() {
            return Err(FilterError::InvalidParams(
                "cannot average an empty speed series".to_string(),
            ));
        }
        if speeds.iter().any(|s| !s.is_finite()) {
            return Err(FilterError::InvalidParams(
                "speed series contains a non-finite value".to_string(),
            ));
        }

        let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
        let params = Self::new(mean);
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a JSON document; missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(raw)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.assumed_speed.is_finite() {
            return Err(FilterError::InvalidParams(
                "assumed_speed must be finite".to_string(),
            ));
        }
        if self.assumed_speed < 0.0 {
            return Err(FilterError::InvalidParams(
                "assumed_speed must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Variance added per second elapsed between measurements.
    pub fn process_noise_rate(&self) -> f64 {
        self.assumed_speed * self.assumed_speed / 1000.0
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::default_params()
    }
}

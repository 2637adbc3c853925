//! Point-at-a-time smoothing for live tracks
//!
//! Wraps an [`AdaptiveAxisFilter`] so callers receiving fixes one by one
//! never handle the initialize/step split themselves.

use tracing::debug;

use crate::error::Result;
use crate::filter::AdaptiveAxisFilter;
use crate::geodesy::haversine_distance;
use crate::measurement::{Estimate, Measurement};
use crate::params::FilterParams;

/// Live track smoother
#[derive(Debug, Clone)]
pub struct TrackSmoother {
    filter: AdaptiveAxisFilter,
    points_seen: usize,
    distance_travelled: f64,
    last_estimate: Option<Estimate>,
}

impl TrackSmoother {
    /// Create a smoother; fails when `params` does not validate.
    pub fn new(params: FilterParams) -> Result<Self> {
        Ok(Self {
            filter: AdaptiveAxisFilter::from_params(params)?,
            points_seen: 0,
            distance_travelled: 0.0,
            last_estimate: None,
        })
    }

    /// Smooth one incoming fix.
    ///
    /// The first fix after construction or [`reset`](Self::reset) seeds the
    /// filter and comes back unchanged.
    pub fn push(&mut self, measurement: &Measurement) -> Estimate {
        let estimate = self.filter.observe(measurement);

        if let Some(previous) = &self.last_estimate {
            self.distance_travelled += haversine_distance(previous, &estimate);
        }
        self.last_estimate = Some(estimate);
        self.points_seen += 1;
        estimate
    }

    /// Drop the current track; the next fix starts a new one.
    pub fn reset(&mut self) {
        debug!(points = self.points_seen, "track smoother reset");
        self.filter = AdaptiveAxisFilter::new(self.filter.assumed_speed());
        self.points_seen = 0;
        self.distance_travelled = 0.0;
        self.last_estimate = None;
    }

    pub fn is_primed(&self) -> bool {
        self.filter.is_initialized()
    }

    pub fn estimate(&self) -> Option<Estimate> {
        self.last_estimate
    }

    pub fn points_seen(&self) -> usize {
        self.points_seen
    }

    /// Cumulative length of the smoothed track in meters
    pub fn distance_travelled(&self) -> f64 {
        self.distance_travelled
    }

    pub fn filter(&self) -> &AdaptiveAxisFilter {
        &self.filter
    }
}

//! Simulation harness for track smoothing
//!
//! Generates a synthetic noisy GPS track and compares raw fixes against the
//! filtered estimates.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{FilterError, Result};
use crate::filter::AdaptiveAxisFilter;
use crate::geodesy::{haversine_distance, offset_by_meters};
use crate::measurement::{Estimate, Measurement};
use crate::params::FilterParams;

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct TrackSimConfig {
    /// Starting position
    pub origin: Estimate,
    /// True travel speed in m/s
    pub speed: f64,
    /// Heading in degrees clockwise from north
    pub heading_deg: f64,
    /// Seconds between fixes
    pub interval: u64,
    pub steps: usize,
    /// Standard deviation of position noise in meters
    pub sigma_noise: f64,
    /// Mean reported accuracy radius
    pub reported_accuracy: f64,
    /// Uniform jitter applied to the reported accuracy
    pub accuracy_jitter: f64,
    /// Speed handed to the filter
    pub assumed_speed: f64,
    pub start_time: u64,
    pub seed: u64,
}

impl Default for TrackSimConfig {
    fn default() -> Self {
        Self {
            origin: Estimate::new(36.0643277, -79.8964272),
            speed: 1.4,
            heading_deg: 0.0,
            interval: 1,
            steps: 500,
            sigma_noise: 5.0,
            reported_accuracy: 5.0,
            accuracy_jitter: 2.0,
            assumed_speed: 3.0,
            start_time: 1_581_923_748,
            seed: 42,
        }
    }
}

impl TrackSimConfig {
    pub fn validate(&self) -> Result<()> {
        let finite_non_negative = [
            ("speed", self.speed),
            ("sigma_noise", self.sigma_noise),
            ("reported_accuracy", self.reported_accuracy),
            ("accuracy_jitter", self.accuracy_jitter),
        ];
        for (name, value) in finite_non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FilterError::InvalidParams(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if !self.heading_deg.is_finite()
            || !self.origin.latitude.is_finite()
            || !self.origin.longitude.is_finite()
        {
            return Err(FilterError::InvalidParams(
                "heading_deg and origin must be finite".to_string(),
            ));
        }

        FilterParams::new(self.assumed_speed).validate()?;

        let last_time = u64::try_from(self.steps)
            .ok()
            .and_then(|steps| steps.checked_mul(self.interval))
            .and_then(|span| self.start_time.checked_add(span));
        if last_time.is_none() {
            return Err(FilterError::InvalidParams(
                "start_time + steps * interval overflows the timestamp range".to_string(),
            ));
        }

        Ok(())
    }
}

/// Simulation results for one fix
#[derive(Debug, Clone)]
pub struct SimStep {
    pub t: u64,
    pub truth: Estimate,
    pub measurement: Measurement,
    pub filtered: Estimate,
    /// Distance from raw fix to truth in meters
    pub err_raw: f64,
    /// Distance from filtered estimate to truth in meters
    pub err_filtered: f64,
}

/// Generate the noisy fixes and matching true positions
pub fn generate_track(config: &TrackSimConfig) -> Result<(Vec<Estimate>, Vec<Measurement>)> {
    config.validate()?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);
    let noise_dist = Normal::new(0.0, config.sigma_noise)
        .map_err(|e| FilterError::InvalidParams(format!("sigma_noise: {e}")))?;

    let heading = config.heading_deg.to_radians();
    let mut truth = Vec::with_capacity(config.steps);
    let mut fixes = Vec::with_capacity(config.steps);

    for step in 0..config.steps {
        let elapsed = step as u64 * config.interval;
        let travelled = config.speed * elapsed as f64;
        let true_pos = offset_by_meters(
            &config.origin,
            travelled * heading.cos(),
            travelled * heading.sin(),
        );

        let noisy = offset_by_meters(
            &true_pos,
            noise_dist.sample(&mut rng),
            noise_dist.sample(&mut rng),
        );
        let jitter = if config.accuracy_jitter > 0.0 {
            rng.gen_range(-config.accuracy_jitter..=config.accuracy_jitter)
        } else {
            0.0
        };
        let accuracy = (config.reported_accuracy + jitter).max(0.0);

        truth.push(true_pos);
        fixes.push(Measurement::new(
            noisy.latitude,
            noisy.longitude,
            accuracy,
            config.start_time + elapsed,
        ));
    }

    Ok((truth, fixes))
}

/// Run the track simulation
pub fn run_simulation(config: &TrackSimConfig) -> Result<Vec<SimStep>> {
    let (truth, fixes) = generate_track(config)?;

    let params = FilterParams::new(config.assumed_speed);
    let mut filter = AdaptiveAxisFilter::from_params(params)?;
    let filtered = filter.process_sequence(&fixes)?;

    let results = truth
        .iter()
        .zip(&fixes)
        .zip(&filtered)
        .map(|((true_pos, fix), est)| SimStep {
            t: fix.timestamp,
            truth: *true_pos,
            measurement: *fix,
            filtered: *est,
            err_raw: haversine_distance(&fix.position(), true_pos),
            err_filtered: haversine_distance(est, true_pos),
        })
        .collect();

    Ok(results)
}

/// Calculate RMS error
pub fn rms_error(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = errors.iter().map(|&e| e * e).sum();
    (sum_sq / errors.len() as f64).sqrt()
}

/// Largest error over the run
pub fn peak_error(results: &[SimStep], get_error: impl Fn(&SimStep) -> f64) -> f64 {
    results.iter().map(get_error).fold(0.0f64, f64::max)
}

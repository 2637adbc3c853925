//! Adaptive axis filter implementation
//!
//! Implements the scalar Kalman recursion shared by the latitude and
//! longitude axes.

use tracing::{debug, warn};

use crate::error::{FilterError, Result};
use crate::measurement::{Estimate, Measurement};
use crate::params::FilterParams;
use crate::state::{FilterState, TrackState};

/// Blend weight for a new measurement: `variance / (variance + accuracy²)`.
///
/// Mathematically in `[0, 1)` for `variance >= 0` and `accuracy >= 1`. In
/// floating point a variance many orders of magnitude above `accuracy²`
/// rounds the gain to exactly `1.0`: the estimate snaps to the measurement
/// and the variance collapses to `0.0`.
pub fn kalman_gain(variance: f64, accuracy: f64) -> f64 {
    variance / (variance + accuracy * accuracy)
}

/// Predict/update one track against a measurement.
fn apply_measurement(
    track: &mut TrackState,
    measurement: &Measurement,
    noise_rate: f64,
) -> Estimate {
    let accuracy = measurement.clamped_accuracy();

    // Predict: uncertainty grows with elapsed time
    let dt = measurement.timestamp.saturating_sub(track.last_update);
    if dt > 0 {
        track.variance += dt as f64 * noise_rate;
        track.last_update = measurement.timestamp;
    } else if measurement.timestamp < track.last_update {
        warn!(
            timestamp = measurement.timestamp,
            last_update = track.last_update,
            "measurement timestamp went backwards; treating as zero elapsed time"
        );
    }

    // Update
    let gain = kalman_gain(track.variance, accuracy);
    track.latitude += gain * (measurement.latitude - track.latitude);
    track.longitude += gain * (measurement.longitude - track.longitude);
    track.variance *= 1.0 - gain;

    debug!(dt, gain, variance = track.variance, "filter step");

    track.estimate()
}

/// Adaptive axis filter
#[derive(Debug, Clone)]
pub struct AdaptiveAxisFilter {
    /// Filter parameters, fixed at construction
    params: FilterParams,
    /// Current state
    state: FilterState,
}

impl AdaptiveAxisFilter {
    /// Create an uninitialized filter for the given assumed speed
    pub fn new(assumed_speed: f64) -> Self {
        Self {
            params: FilterParams::new(assumed_speed),
            state: FilterState::Uninitialized,
        }
    }

    /// Create an uninitialized filter from validated parameters
    pub fn from_params(params: FilterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            state: FilterState::Uninitialized,
        })
    }

    /// Seed the filter from a first measurement.
    ///
    /// Discards any previous track. The raw reported accuracy becomes the
    /// initial standard deviation.
    pub fn initialize(&mut self, measurement: &Measurement) {
        self.state = FilterState::Ready(TrackState::from_measurement(measurement));
        debug!(
            latitude = measurement.latitude,
            longitude = measurement.longitude,
            accuracy = measurement.accuracy,
            timestamp = measurement.timestamp,
            "filter initialized"
        );
    }

    /// Perform one predict/update step
    ///
    /// # Arguments
    /// * `measurement` - New GPS fix; its accuracy is floored to `MIN_ACCURACY`
    ///
    /// # Returns
    /// The corrected position estimate
    pub fn step(&mut self, measurement: &Measurement) -> Result<Estimate> {
        let FilterState::Ready(mut track) = self.state else {
            return Err(FilterError::NotInitialized);
        };
        let rate = self.params.process_noise_rate();
        let estimate = apply_measurement(&mut track, measurement, rate);
        self.state = FilterState::Ready(track);
        Ok(estimate)
    }

    /// Step with a fix, seeding the filter from it first when uninitialized.
    ///
    /// A seeding fix is stepped like any other, so it comes back unchanged.
    pub fn observe(&mut self, measurement: &Measurement) -> Estimate {
        let mut track = match self.state {
            FilterState::Ready(track) => track,
            FilterState::Uninitialized => {
                debug!(timestamp = measurement.timestamp, "filter seeded from live fix");
                TrackState::from_measurement(measurement)
            }
        };
        let rate = self.params.process_noise_rate();
        let estimate = apply_measurement(&mut track, measurement, rate);
        self.state = FilterState::Ready(track);
        estimate
    }

    /// Run the filter over an ordered, non-empty track.
    ///
    /// The first sample seeds the filter and is then stepped like every
    /// other sample, so the output has one estimate per input.
    pub fn process_sequence(&mut self, samples: &[Measurement]) -> Result<Vec<Estimate>> {
        let first = samples.first().ok_or(FilterError::EmptySequence)?;
        self.initialize(first);

        let mut filtered = Vec::with_capacity(samples.len());
        for sample in samples {
            filtered.push(self.step(sample)?);
        }

        debug!(
            samples = samples.len(),
            variance = self.variance().unwrap_or_default(),
            "processed sequence"
        );
        Ok(filtered)
    }

    /// Column-oriented variant of [`process_sequence`](Self::process_sequence).
    ///
    /// All four columns must have the same length; sample `i` uses the
    /// accuracy at index `i`.
    pub fn process_columns(
        &mut self,
        latitudes: &[f64],
        longitudes: &[f64],
        accuracies: &[f64],
        timestamps: &[u64],
    ) -> Result<Vec<Estimate>> {
        let expected = latitudes.len();
        for (context, got) in [
            ("longitude", longitudes.len()),
            ("accuracy", accuracies.len()),
            ("timestamp", timestamps.len()),
        ] {
            if got != expected {
                return Err(FilterError::LengthMismatch {
                    context,
                    expected,
                    got,
                });
            }
        }

        let samples: Vec<Measurement> = latitudes
            .iter()
            .zip(longitudes)
            .zip(accuracies)
            .zip(timestamps)
            .map(|(((&lat, &lon), &acc), &t)| Measurement::new(lat, lon, acc, t))
            .collect();

        self.process_sequence(&samples)
    }

    /// Current position estimate, if initialized
    pub fn estimate(&self) -> Option<Estimate> {
        self.state.track().map(TrackState::estimate)
    }

    /// Current estimate variance, if initialized
    pub fn variance(&self) -> Option<f64> {
        self.state.track().map(|track| track.variance)
    }

    /// Time of the last time-advancing measurement, if initialized
    pub fn last_update(&self) -> Option<u64> {
        self.state.track().map(|track| track.last_update)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_ready()
    }

    /// Get the current state
    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    pub fn assumed_speed(&self) -> f64 {
        self.params.assumed_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    fn seeded(speed: f64, m: Measurement) -> AdaptiveAxisFilter {
        let mut filter = AdaptiveAxisFilter::new(speed);
        filter.initialize(&m);
        filter
    }

    #[test]
    fn test_filter_creation() {
        let filter = AdaptiveAxisFilter::new(15.0);
        assert!(!filter.is_initialized());
        assert_eq!(filter.assumed_speed(), 15.0);
        assert_eq!(filter.estimate(), None);
        assert_eq!(filter.state(), FilterState::Uninitialized);
    }

    #[test]
    fn test_zero_speed_accepted() {
        let filter = AdaptiveAxisFilter::new(0.0);
        assert_eq!(filter.assumed_speed(), 0.0);
    }

    #[test]
    fn test_from_params_validates() {
        assert!(AdaptiveAxisFilter::from_params(FilterParams::new(f64::INFINITY)).is_err());
        assert!(AdaptiveAxisFilter::from_params(FilterParams::new(4.0)).is_ok());
    }

    #[test]
    fn test_step_before_initialize_fails() {
        let mut filter = AdaptiveAxisFilter::new(15.0);
        let result = filter.step(&Measurement::new(1.0, 2.0, 5.0, 0));
        assert!(matches!(result, Err(FilterError::NotInitialized)));
        assert!(!filter.is_initialized());
    }

    #[test]
    fn test_initialize_returns_input_exactly() {
        let filter = seeded(15.0, Measurement::new(36.0643277, -79.8964272, 5.0, 100));
        assert_eq!(filter.estimate(), Some(Estimate::new(36.0643277, -79.8964272)));
        assert_eq!(filter.variance(), Some(25.0));
        assert_eq!(filter.last_update(), Some(100));
    }

    #[test]
    fn test_reinitialize_discards_track() {
        let mut filter = seeded(15.0, Measurement::new(1.0, 1.0, 5.0, 0));
        filter.step(&Measurement::new(2.0, 2.0, 5.0, 10)).unwrap();
        filter.initialize(&Measurement::new(-3.0, 4.0, 2.0, 3));
        assert_eq!(filter.estimate(), Some(Estimate::new(-3.0, 4.0)));
        assert_eq!(filter.variance(), Some(4.0));
        assert_eq!(filter.last_update(), Some(3));
    }

    #[test]
    fn test_step_matches_recursion() {
        let mut filter = seeded(15.0, Measurement::new(10.0, 20.0, 5.0, 0));
        let est = filter.step(&Measurement::new(11.0, 19.0, 3.0, 4)).unwrap();

        let variance = 25.0 + 4.0 * 15.0 * 15.0 / 1000.0;
        let gain = variance / (variance + 9.0);
        assert_relative_eq!(est.latitude, 10.0 + gain * 1.0, epsilon = 1e-12);
        assert_relative_eq!(est.longitude, 20.0 - gain * 1.0, epsilon = 1e-12);
        assert_relative_eq!(filter.variance().unwrap(), (1.0 - gain) * variance, epsilon = 1e-12);
        assert_eq!(filter.last_update(), Some(4));
    }

    #[test]
    fn test_accuracy_floor_applied_on_step() {
        let mut floored = seeded(0.0, Measurement::new(0.0, 0.0, 2.0, 0));
        let mut explicit = floored.clone();

        let a = floored.step(&Measurement::new(1.0, 1.0, 0.0, 0)).unwrap();
        let b = explicit.step(&Measurement::new(1.0, 1.0, 1.0, 0)).unwrap();
        assert_eq!(a, b);
        // gain = 4 / (4 + 1)
        assert_relative_eq!(a.latitude, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_backwards_time_is_zero_elapsed() {
        let mut filter = seeded(15.0, Measurement::new(0.0, 0.0, 5.0, 100));
        let mut same_time = filter.clone();

        let back = filter.step(&Measurement::new(1.0, 1.0, 5.0, 40)).unwrap();
        let still = same_time.step(&Measurement::new(1.0, 1.0, 5.0, 100)).unwrap();

        assert_eq!(back, still);
        assert_eq!(filter.variance(), same_time.variance());
        assert_eq!(filter.last_update(), Some(100));
    }

    #[test]
    fn test_variance_decreases_without_elapsed_time() {
        let mut filter = seeded(15.0, Measurement::new(0.0, 0.0, 5.0, 0));
        let mut previous = filter.variance().unwrap();
        for _ in 0..10 {
            filter.step(&Measurement::new(0.5, 0.5, 5.0, 0)).unwrap();
            let current = filter.variance().unwrap();
            assert!(current < previous);
            assert!(current >= 0.0);
            previous = current;
        }
    }

    #[test]
    fn test_longer_gap_gives_larger_gain() {
        let start = Measurement::new(0.0, 0.0, 5.0, 0);
        let mut short = seeded(15.0, start);
        let mut long = seeded(15.0, start);

        let near = short.step(&Measurement::new(1.0, 1.0, 5.0, 2)).unwrap();
        let far = long.step(&Measurement::new(1.0, 1.0, 5.0, 60)).unwrap();
        assert!(far.latitude > near.latitude);
        assert!(far.longitude > near.longitude);
    }

    #[test]
    fn test_observe_seeds_then_steps() {
        let first = Measurement::new(5.0, 6.0, 3.0, 10);
        let second = Measurement::new(5.1, 6.1, 3.0, 12);

        let mut live = AdaptiveAxisFilter::new(10.0);
        assert_eq!(live.observe(&first), first.position());
        let live_second = live.observe(&second);

        let mut batch = AdaptiveAxisFilter::new(10.0);
        let out = batch.process_sequence(&[first, second]).unwrap();
        assert_eq!(live_second, out[1]);
        assert_eq!(live.variance(), batch.variance());
    }

    #[derive(Clone, Default)]
    struct DebugFields(Arc<Mutex<Vec<Vec<String>>>>);

    struct FieldNames(Vec<String>);

    impl Visit for FieldNames {
        fn record_debug(&mut self, field: &Field, _value: &dyn std::fmt::Debug) {
            self.0.push(field.name().to_string());
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for DebugFields {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::DEBUG {
                let mut names = FieldNames(Vec::new());
                event.record(&mut names);
                self.0.lock().unwrap().push(names.0);
            }
        }
    }

    #[test]
    fn test_step_logs_dt_gain_and_variance_at_debug() {
        let recorder = DebugFields::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let mut filter = seeded(15.0, Measurement::new(0.0, 0.0, 5.0, 0));
            filter.step(&Measurement::new(1.0, 1.0, 5.0, 7)).unwrap();
        });

        let events = recorder.0.lock().unwrap();
        assert!(events.iter().any(|fields| {
            ["dt", "gain", "variance"]
                .iter()
                .all(|name| fields.iter().any(|f| f == name))
        }));
    }

    #[test]
    fn test_gain_saturates_for_huge_variance() {
        let mut filter = seeded(0.0, Measurement::new(0.0, 0.0, 1e9, 0));
        let est = filter.step(&Measurement::new(1.0, 2.0, 1.0, 0)).unwrap();
        assert_eq!(kalman_gain(1e18, 1.0), 1.0);
        assert_eq!(est, Estimate::new(1.0, 2.0));
        assert_eq!(filter.variance(), Some(0.0));
    }

    #[test]
    fn test_gain_bounds() {
        assert_eq!(kalman_gain(0.0, 1.0), 0.0);
        let g = kalman_gain(1e12, 1.0);
        assert!(g > 0.0 && g < 1.0);
    }

    #[test]
    fn test_process_sequence_empty() {
        let mut filter = AdaptiveAxisFilter::new(15.0);
        assert!(matches!(
            filter.process_sequence(&[]),
            Err(FilterError::EmptySequence)
        ));
    }

    #[test]
    fn test_process_sequence_first_output_is_first_input() {
        let samples = [
            Measurement::new(5.0, 6.0, 3.0, 10),
            Measurement::new(5.1, 6.1, 3.0, 12),
        ];
        let mut filter = AdaptiveAxisFilter::new(10.0);
        let out = filter.process_sequence(&samples).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Estimate::new(5.0, 6.0));
    }

    #[test]
    fn test_process_columns_length_mismatch() {
        let mut filter = AdaptiveAxisFilter::new(15.0);
        let result = filter.process_columns(&[1.0, 2.0], &[1.0, 2.0], &[5.0], &[0, 1]);
        match result {
            Err(FilterError::LengthMismatch {
                context,
                expected,
                got,
            }) => {
                assert_eq!(context, "accuracy");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!filter.is_initialized());
    }

    #[test]
    fn test_process_columns_uses_matching_accuracy() {
        let lats = [0.0, 1.0, 1.0];
        let lons = [0.0, 1.0, 1.0];
        let accs = [5.0, 1.0, 50.0];
        let times = [0, 0, 0];

        let mut columns = AdaptiveAxisFilter::new(0.0);
        let by_columns = columns.process_columns(&lats, &lons, &accs, &times).unwrap();

        let samples: Vec<Measurement> = (0..3)
            .map(|i| Measurement::new(lats[i], lons[i], accs[i], times[i]))
            .collect();
        let mut records = AdaptiveAxisFilter::new(0.0);
        let by_records = records.process_sequence(&samples).unwrap();

        assert_eq!(by_columns, by_records);
    }
}

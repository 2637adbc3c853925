//! geosmooth - adaptive GPS track smoothing
//!
//! A scalar Kalman-style estimator that smooths noisy latitude/longitude
//! measurements using the accuracy radius each sample reports and an
//! assumed travel speed to model how fast uncertainty grows between samples.
//! Both axes share one error variance.

pub mod error;
pub mod filter;
pub mod geodesy;
pub mod measurement;
pub mod params;
pub mod sim;
pub mod state;
pub mod stream;

// Re-export main types
pub use error::{FilterError, Result};
pub use filter::AdaptiveAxisFilter;
pub use measurement::{Estimate, Measurement, MIN_ACCURACY};
pub use params::FilterParams;
pub use state::{FilterState, TrackState};
pub use stream::TrackSmoother;

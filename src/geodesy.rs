// Geodesy helpers - great-circle distances on a spherical earth
//
// Used to measure how far a smoothed track travels and how far an estimate
// sits from the truth in the simulation harness.

use crate::measurement::Estimate;

/// Degrees to radians conversion factor
const DTOR: f64 = std::f64::consts::PI / 180.0;

/// Average radius for spherical Earth approximation in meters
pub const EARTH_RADIUS_M: f64 = 6371e3;

/// Great-circle distance between two positions in meters (haversine formula)
pub fn haversine_distance(a: &Estimate, b: &Estimate) -> f64 {
    let lat1 = a.latitude * DTOR;
    let lat2 = b.latitude * DTOR;
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude) * DTOR;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Sum of haversine distances between consecutive positions
pub fn track_length(points: &[Estimate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Move a position by a north/east offset in meters.
///
/// Small-offset approximation; not meaningful near the poles.
pub fn offset_by_meters(origin: &Estimate, north_m: f64, east_m: f64) -> Estimate {
    let dlat = north_m / EARTH_RADIUS_M / DTOR;
    let dlon = east_m / (EARTH_RADIUS_M * (origin.latitude * DTOR).cos()) / DTOR;
    Estimate::new(origin.latitude + dlat, origin.longitude + dlon)
}

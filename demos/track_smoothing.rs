//! Track Smoothing Simulation Example
//!
//! Runs a synthetic noisy walk through the filter and compares raw fixes
//! against the smoothed track. Set RUST_LOG=geosmooth=debug for per-step logs.

use anyhow::Context;
use geosmooth::geodesy::track_length;
use geosmooth::sim::{peak_error, rms_error, run_simulation, TrackSimConfig};
use geosmooth::{Estimate, FilterParams, TrackSmoother};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Running track smoothing simulation...\n");

    let config = TrackSimConfig {
        speed: 1.4,
        heading_deg: 45.0,
        interval: 1,
        steps: 600,
        sigma_noise: 5.0,
        reported_accuracy: 5.0,
        accuracy_jitter: 2.0,
        assumed_speed: 3.0,
        seed: 42,
        ..Default::default()
    };

    println!("Configuration:");
    println!("  True speed:      {} m/s", config.speed);
    println!("  Heading:         {} deg", config.heading_deg);
    println!("  Fixes:           {} every {} s", config.steps, config.interval);
    println!("  Noise sigma:     {} m", config.sigma_noise);
    println!("  Assumed speed:   {} m/s", config.assumed_speed);
    println!();

    let results = run_simulation(&config).context("simulation failed")?;

    let errors_raw: Vec<f64> = results.iter().map(|r| r.err_raw).collect();
    let errors_filtered: Vec<f64> = results.iter().map(|r| r.err_filtered).collect();

    let truth: Vec<Estimate> = results.iter().map(|r| r.truth).collect();
    let raw: Vec<Estimate> = results.iter().map(|r| r.measurement.position()).collect();
    let filtered: Vec<Estimate> = results.iter().map(|r| r.filtered).collect();

    println!("METRICS SUMMARY");
    println!("===============");
    println!("\nRMS Errors (m):");
    println!("  Raw fixes:      {:.3}", rms_error(&errors_raw));
    println!("  Filtered:       {:.3}", rms_error(&errors_filtered));

    println!("\nPeak Errors (m):");
    println!("  Raw fixes:      {:.3}", peak_error(&results, |s| s.err_raw));
    println!("  Filtered:       {:.3}", peak_error(&results, |s| s.err_filtered));

    println!("\nTrack Length (m):");
    println!("  Truth:          {:.1}", track_length(&truth));
    println!("  Raw fixes:      {:.1}", track_length(&raw));
    println!("  Filtered:       {:.1}", track_length(&filtered));

    // Replay the same fixes one at a time, as a live feed would deliver them
    let mut smoother = TrackSmoother::new(FilterParams::new(config.assumed_speed))?;
    for step in &results {
        smoother.push(&step.measurement);
    }
    println!("\nLive replay:");
    println!("  Points:         {}", smoother.points_seen());
    println!("  Distance:       {:.1} m", smoother.distance_travelled());

    println!("\nDone!");
    Ok(())
}

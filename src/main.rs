// Lane Tracker - Main Entry Point
// Licensed under AGPL v3

use clap::Parser;
use nalgebra::{DMatrix, DVector};
use tracing::{error, info};

use lane_tracker::config::Config;
use lane_tracker::detector::DashedLaneDetector;
use lane_tracker::kalman::LinearKalman;
use lane_tracker::output::{CsvOutput, JsonOutput, OutputHandler};
use lane_tracker::stats::TrackStatistics;
use lane_tracker::tracker::LaneTracker;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    info!("Starting lane tracker");
    info!(
        "Frames: {}, initial position: {}, lane speed: {} px/frame",
        config.num_frames, config.initial_position, config.lane_speed
    );

    // Build the filter from the configured model
    let f = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]);
    let h = DMatrix::from_row_slice(1, 2, &[1.0, 0.0]);
    let q = DMatrix::identity(2, 2) * config.process_noise;
    let r = DMatrix::from_element(1, 1, config.measurement_variance);
    let x0 = DVector::from_vec(vec![config.initial_position, 0.0]);
    let p0 = DMatrix::identity(2, 2);

    let kalman = LinearKalman::new(&f, &h, &q, &r, &x0, &p0)?;
    let mut tracker = LaneTracker::new(kalman);

    // Build the synthetic detector
    let mut detector = DashedLaneDetector::new(
        config.frame_width,
        config.num_frames,
        config.lane_speed,
        config.seed,
    )
    .with_noise(config.noise_std);

    if let Some((period, len)) = config.dropout_spec()? {
        info!("Dropout enabled: {} of every {} frames", len, period);
        detector = detector.with_dropout(period, len);
    }

    // Setup outputs
    let mut outputs: Vec<Box<dyn OutputHandler>> = Vec::new();

    if let Some(path) = &config.write_csv {
        info!("Writing CSV results to {}", path);
        match CsvOutput::new(path) {
            Ok(csv_out) => outputs.push(Box::new(csv_out)),
            Err(e) => error!("Failed to open CSV output file {}: {}", path, e),
        }
    }

    if let Some(path) = &config.write_json {
        info!("Writing JSON results to {}", path);
        outputs.push(Box::new(JsonOutput::new(path)));
    }

    // Run the tracking loop
    let track = tracker.run(&mut detector, config.num_frames);
    let stats = TrackStatistics::from_track(&track);

    for point in &track {
        for output in outputs.iter_mut() {
            output.handle_point(point);
        }
    }
    for output in outputs.iter_mut() {
        output.finish(&track, &stats);
    }

    info!(
        "Processed {} frames: {} corrected, {} coasted, {} singular skips",
        track.len(),
        tracker.measurement_count,
        tracker.coast_count,
        tracker.singular_count
    );
    info!(
        "Deviation over {} measured frames: mean {:.3} px, max {:.3} px",
        stats.measured_frames, stats.mean_error, stats.max_error
    );

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}

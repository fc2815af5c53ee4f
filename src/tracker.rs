// Lane tracking
//
// Drives the Kalman filter over a frame sequence: predict every frame,
// correct only when the detector produced a centroid.

use serde::Serialize;
use tracing::{debug, warn};

use crate::detector::Detector;
use crate::kalman::LinearKalman;

/// Per-frame tracker output: the filtered estimate paired with the raw
/// measurement that produced it (absent when the filter coasted).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPoint {
    /// Frame index
    pub step: usize,
    /// Filtered position estimate
    pub estimate: f64,
    /// Filtered velocity estimate
    pub velocity: f64,
    /// Raw measurement, if one was used this frame
    pub measurement: Option<f64>,
}

/// Single-lane tracker
///
/// Owns one filter and the per-run counters. State advances strictly one
/// frame at a time; each frame is predicted exactly once before any
/// correction.
pub struct LaneTracker {
    kalman: LinearKalman,

    /// Frames corrected with a measurement
    pub measurement_count: usize,
    /// Frames coasted on the prediction alone
    pub coast_count: usize,
    /// Corrections skipped due to a singular innovation covariance
    pub singular_count: usize,
}

impl LaneTracker {
    /// Create a tracker around an existing filter.
    pub fn new(kalman: LinearKalman) -> Self {
        LaneTracker {
            kalman,
            measurement_count: 0,
            coast_count: 0,
            singular_count: 0,
        }
    }

    /// Create a tracker with the canonical constant-velocity filter.
    pub fn with_defaults(initial_position: f64) -> Self {
        Self::new(LinearKalman::constant_velocity(initial_position))
    }

    /// Process one frame.
    ///
    /// Predicts, then corrects if a measurement is present. A singular
    /// innovation covariance downgrades the frame to predict-only; the
    /// measurement slot is recorded as absent, matching a missed detection.
    pub fn step(&mut self, step: usize, measurement: Option<f64>) -> TrackPoint {
        let (predicted, _) = self.kalman.predict();

        match measurement {
            Some(z) => match self.kalman.correct(z) {
                Ok((corrected, _)) => {
                    self.measurement_count += 1;
                    TrackPoint {
                        step,
                        estimate: corrected.x,
                        velocity: corrected.y,
                        measurement: Some(z),
                    }
                }
                Err(e) => {
                    // Only SingularInnovation can occur once the filter exists
                    warn!(step, measurement = z, error = %e, "skipping correction");
                    self.singular_count += 1;
                    TrackPoint {
                        step,
                        estimate: predicted.x,
                        velocity: predicted.y,
                        measurement: None,
                    }
                }
            },
            None => {
                debug!(step, "no measurement, coasting on prediction");
                self.coast_count += 1;
                TrackPoint {
                    step,
                    estimate: predicted.x,
                    velocity: predicted.y,
                    measurement: None,
                }
            }
        }
    }

    /// Run the tracker over a detector for a fixed number of frames.
    ///
    /// Returns one `TrackPoint` per frame, in frame order.
    pub fn run<D: Detector>(&mut self, detector: &mut D, num_frames: usize) -> Vec<TrackPoint> {
        let mut track = Vec::with_capacity(num_frames);
        for frame in 0..num_frames {
            let measurement = detector.detect(frame);
            track.push(self.step(frame, measurement));
        }
        track
    }

    /// The underlying filter (read-only).
    pub fn kalman(&self) -> &LinearKalman {
        &self.kalman
    }
}

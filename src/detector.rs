// Lane centroid detectors
//
// A detector supplies at most one centroid position per frame. Absence is
// a normal outcome (broken dash, nothing in view), not an error.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::constants::{DEFAULT_FRAME_WIDTH, DEFAULT_LANE_SPEED, DEFAULT_NUM_FRAMES};

/// Source of per-frame centroid measurements
pub trait Detector {
    /// Detected centroid x-position for the given frame, if any.
    fn detect(&mut self, frame: usize) -> Option<f64>;
}

/// Synthetic dashed-lane detector
///
/// Reproduces the reference test pattern: a lane line starting at the frame
/// centre and drifting sideways at a constant rate. Optional zero-mean
/// Gaussian noise models centroid jitter, and an optional dash gap drops
/// measurements for `dropout_len` frames out of every `dropout_period`.
pub struct DashedLaneDetector {
    width: usize,
    num_frames: usize,
    speed: f64,
    noise: Option<Normal<f64>>,
    dropout: Option<(usize, usize)>, // (period, len)
    rng: StdRng,
}

impl DashedLaneDetector {
    pub fn new(width: usize, num_frames: usize, speed: f64, seed: u64) -> Self {
        DashedLaneDetector {
            width,
            num_frames,
            speed,
            noise: None,
            dropout: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reference geometry: 640px frames, 30 frames, 5px drift per frame.
    pub fn reference(seed: u64) -> Self {
        Self::new(DEFAULT_FRAME_WIDTH, DEFAULT_NUM_FRAMES, DEFAULT_LANE_SPEED, seed)
    }

    /// Add zero-mean Gaussian noise with the given standard deviation.
    /// A non-positive deviation leaves the detector noiseless.
    pub fn with_noise(mut self, std_dev: f64) -> Self {
        self.noise = if std_dev > 0.0 {
            Normal::new(0.0, std_dev).ok()
        } else {
            None
        };
        self
    }

    /// Drop measurements for `len` frames out of every `period` frames.
    /// A zero period or length disables dropout.
    pub fn with_dropout(mut self, period: usize, len: usize) -> Self {
        self.dropout = if period > 0 && len > 0 {
            Some((period, len.min(period)))
        } else {
            None
        };
        self
    }

    /// True lane position for a frame (centre offset by constant drift).
    pub fn true_position(&self, frame: usize) -> f64 {
        let centre = (self.width / 2) as f64;
        centre + (frame as f64 - (self.num_frames / 2) as f64) * self.speed
    }

    fn in_gap(&self, frame: usize) -> bool {
        match self.dropout {
            Some((period, len)) => frame % period >= period - len,
            None => false,
        }
    }
}

impl Detector for DashedLaneDetector {
    fn detect(&mut self, frame: usize) -> Option<f64> {
        if self.in_gap(frame) {
            return None;
        }
        let jitter = match self.noise {
            Some(dist) => self.rng.sample(dist),
            None => 0.0,
        };
        Some(self.true_position(frame) + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noiseless_motion_is_linear() {
        let mut det = DashedLaneDetector::reference(1);

        // Centre frame sits at the image centre, neighbours step by 5px
        assert_eq!(det.detect(15), Some(320.0));
        assert_eq!(det.detect(16), Some(325.0));
        assert_eq!(det.detect(0), Some(320.0 - 15.0 * 5.0));

        for frame in 1..30 {
            let prev = det.detect(frame - 1).unwrap();
            let cur = det.detect(frame).unwrap();
            assert!((cur - prev - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dropout_pattern() {
        let mut det = DashedLaneDetector::reference(1).with_dropout(5, 2);

        // Last 2 frames of every 5-frame period are gaps
        for frame in 0..30 {
            let expect_gap = frame % 5 >= 3;
            assert_eq!(det.detect(frame).is_none(), expect_gap, "frame {}", frame);
        }
    }

    #[test]
    fn test_noise_is_seeded() {
        let mut a = DashedLaneDetector::reference(42).with_noise(2.0);
        let mut b = DashedLaneDetector::reference(42).with_noise(2.0);

        for frame in 0..30 {
            assert_eq!(a.detect(frame), b.detect(frame));
        }
    }

    #[test]
    fn test_noise_perturbs_but_stays_near_truth() {
        let mut det = DashedLaneDetector::reference(7).with_noise(1.0);
        let mut saw_jitter = false;

        for frame in 0..30 {
            let z = det.detect(frame).unwrap();
            let truth = det.true_position(frame);
            assert!((z - truth).abs() < 10.0);
            if (z - truth).abs() > 1e-9 {
                saw_jitter = true;
            }
        }
        assert!(saw_jitter);
    }

    #[test]
    fn test_zero_noise_std_disables_noise() {
        let mut det = DashedLaneDetector::reference(3).with_noise(0.0);
        assert_eq!(det.detect(15), Some(320.0));
    }
}

// Tracking error statistics
//
// Error is |measurement - estimate| and only exists for frames where the
// detector produced a measurement; coasted frames contribute no error.

use serde::Serialize;

use crate::tracker::TrackPoint;

/// One entry of the error-over-time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPoint {
    pub step: usize,
    pub error: f64,
}

/// Aggregated deviation statistics for a finished track
#[derive(Debug, Clone, Serialize)]
pub struct TrackStatistics {
    /// Per-frame deviation for measured frames, in frame order
    pub errors: Vec<ErrorPoint>,
    /// Frames corrected with a measurement
    pub measured_frames: usize,
    /// Frames coasted without one
    pub coasted_frames: usize,
    /// Mean absolute deviation over measured frames
    pub mean_error: f64,
    /// Largest absolute deviation over measured frames
    pub max_error: f64,
}

impl TrackStatistics {
    pub fn from_track(track: &[TrackPoint]) -> Self {
        let mut errors = Vec::new();
        let mut coasted = 0;

        for point in track {
            match point.measurement {
                Some(z) => errors.push(ErrorPoint {
                    step: point.step,
                    error: (z - point.estimate).abs(),
                }),
                None => coasted += 1,
            }
        }

        let measured = errors.len();
        let mean_error = if measured > 0 {
            errors.iter().map(|e| e.error).sum::<f64>() / measured as f64
        } else {
            0.0
        };
        let max_error = errors.iter().map(|e| e.error).fold(0.0, f64::max);

        TrackStatistics {
            errors,
            measured_frames: measured,
            coasted_frames: coasted,
            mean_error,
            max_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(step: usize, estimate: f64, measurement: Option<f64>) -> TrackPoint {
        TrackPoint {
            step,
            estimate,
            velocity: 0.0,
            measurement,
        }
    }

    #[test]
    fn test_mixed_track_aggregation() {
        let track = vec![
            point(0, 100.0, Some(103.0)),
            point(1, 105.0, None),
            point(2, 110.0, Some(109.0)),
            point(3, 115.0, None),
        ];

        let stats = TrackStatistics::from_track(&track);

        assert_eq!(stats.measured_frames, 2);
        assert_eq!(stats.coasted_frames, 2);
        assert_eq!(stats.errors.len(), 2);
        assert_eq!(stats.errors[0], ErrorPoint { step: 0, error: 3.0 });
        assert_eq!(stats.errors[1], ErrorPoint { step: 2, error: 1.0 });
        assert!((stats.mean_error - 2.0).abs() < 1e-12);
        assert!((stats.max_error - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_track() {
        let stats = TrackStatistics::from_track(&[]);
        assert_eq!(stats.measured_frames, 0);
        assert_eq!(stats.coasted_frames, 0);
        assert_eq!(stats.mean_error, 0.0);
        assert_eq!(stats.max_error, 0.0);
    }

    #[test]
    fn test_all_coasted_track() {
        let track = vec![point(0, 100.0, None), point(1, 105.0, None)];
        let stats = TrackStatistics::from_track(&track);
        assert_eq!(stats.measured_frames, 0);
        assert_eq!(stats.coasted_frames, 2);
        assert!(stats.errors.is_empty());
    }
}

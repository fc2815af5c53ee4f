// Shared constants for lane tracking (defaults match the reference test pattern)

/// Default number of frames in a synthetic run.
pub const DEFAULT_NUM_FRAMES: usize = 30;

/// Default frame width in pixels.
pub const DEFAULT_FRAME_WIDTH: usize = 640;

/// Default lane drift per frame in pixels.
pub const DEFAULT_LANE_SPEED: f64 = 5.0;

/// Default initial position estimate (frame centre of a 640px frame).
pub const DEFAULT_INITIAL_POSITION: f64 = 320.0;

/// Default process noise scale (diagonal of Q).
pub const DEFAULT_PROCESS_NOISE: f64 = 0.03;

/// Default measurement noise variance (R).
pub const DEFAULT_MEASUREMENT_VARIANCE: f64 = 1.0;

/// Threshold below which the innovation covariance is treated as singular.
pub const SINGULAR_S_EPS: f64 = 1e-12;

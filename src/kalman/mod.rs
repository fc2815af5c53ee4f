// Kalman filter module
// Provides state estimation for lane position tracking

pub mod linear;

pub use linear::{KalmanError, LinearKalman};

// Linear Kalman filter for 1-D lane position tracking
//
// Constant-velocity model over a scalar measurement stream:
// state is [position, velocity], only position is observed.

use std::fmt;

use nalgebra::{DMatrix, DVector, Matrix1x2, Matrix2, Vector2};

use crate::constants::{
    DEFAULT_MEASUREMENT_VARIANCE, DEFAULT_PROCESS_NOISE, SINGULAR_S_EPS,
};

/// Errors from filter construction and correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KalmanError {
    /// A model matrix had the wrong shape at construction time.
    InvalidDimension {
        matrix: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// The innovation covariance was numerically zero in `correct`.
    SingularInnovation,
}

impl fmt::Display for KalmanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KalmanError::InvalidDimension { matrix, expected, actual } => write!(
                f,
                "{} matrix has shape {}x{}, expected {}x{}",
                matrix, actual.0, actual.1, expected.0, expected.1
            ),
            KalmanError::SingularInnovation => {
                write!(f, "innovation covariance is singular")
            }
        }
    }
}

impl std::error::Error for KalmanError {}

/// Linear Kalman filter over a [position, velocity] state
///
/// The model matrices are fixed for the life of the filter; state and
/// covariance evolve only through `predict` and `correct`.
#[derive(Debug, Clone)]
pub struct LinearKalman {
    // Filter state
    state: Vector2<f64>,     // [position, velocity]
    covariance: Matrix2<f64>,

    // Constant model matrices
    transition: Matrix2<f64>,        // F
    measurement: Matrix1x2<f64>,     // H
    process_noise: Matrix2<f64>,     // Q
    measurement_noise: f64,          // R (1x1)
}

fn check_shape(
    matrix: &'static str,
    m: &DMatrix<f64>,
    expected: (usize, usize),
) -> Result<(), KalmanError> {
    if m.shape() != expected {
        return Err(KalmanError::InvalidDimension {
            matrix,
            expected,
            actual: m.shape(),
        });
    }
    Ok(())
}

impl LinearKalman {
    /// Create a filter from dynamically-shaped model matrices.
    ///
    /// Shapes are validated up front: F 2x2, H 1x2, Q 2x2, R 1x1, the
    /// initial state length 2 and the initial covariance 2x2. Returns
    /// `InvalidDimension` on the first mismatch.
    pub fn new(
        transition: &DMatrix<f64>,
        measurement: &DMatrix<f64>,
        process_noise: &DMatrix<f64>,
        measurement_noise: &DMatrix<f64>,
        initial_state: &DVector<f64>,
        initial_covariance: &DMatrix<f64>,
    ) -> Result<Self, KalmanError> {
        check_shape("transition", transition, (2, 2))?;
        check_shape("measurement", measurement, (1, 2))?;
        check_shape("process noise", process_noise, (2, 2))?;
        check_shape("measurement noise", measurement_noise, (1, 1))?;
        if initial_state.len() != 2 {
            return Err(KalmanError::InvalidDimension {
                matrix: "initial state",
                expected: (2, 1),
                actual: (initial_state.len(), 1),
            });
        }
        check_shape("initial covariance", initial_covariance, (2, 2))?;

        Ok(LinearKalman {
            state: Vector2::new(initial_state[0], initial_state[1]),
            covariance: Matrix2::new(
                initial_covariance[(0, 0)],
                initial_covariance[(0, 1)],
                initial_covariance[(1, 0)],
                initial_covariance[(1, 1)],
            ),
            transition: Matrix2::new(
                transition[(0, 0)],
                transition[(0, 1)],
                transition[(1, 0)],
                transition[(1, 1)],
            ),
            measurement: Matrix1x2::new(measurement[(0, 0)], measurement[(0, 1)]),
            process_noise: Matrix2::new(
                process_noise[(0, 0)],
                process_noise[(0, 1)],
                process_noise[(1, 0)],
                process_noise[(1, 1)],
            ),
            measurement_noise: measurement_noise[(0, 0)],
        })
    }

    /// Canonical constant-velocity filter for lane tracking.
    ///
    /// F = [[1, 1], [0, 1]], H = [1, 0], Q = 0.03*I, R = 1, with the state
    /// seeded at the given position, zero velocity and identity covariance.
    pub fn constant_velocity(initial_position: f64) -> Self {
        LinearKalman {
            state: Vector2::new(initial_position, 0.0),
            covariance: Matrix2::identity(),
            transition: Matrix2::new(1.0, 1.0, 0.0, 1.0),
            measurement: Matrix1x2::new(1.0, 0.0),
            process_noise: Matrix2::identity() * DEFAULT_PROCESS_NOISE,
            measurement_noise: DEFAULT_MEASUREMENT_VARIANCE,
        }
    }

    /// Predict step
    ///
    /// x = F * x, P = F * P * Ft + Q. Always succeeds; returns the
    /// post-update state and covariance.
    pub fn predict(&mut self) -> (Vector2<f64>, Matrix2<f64>) {
        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;
        (self.state, self.covariance)
    }

    /// Correct step for a single scalar measurement
    ///
    /// Standard Kalman update: innovation y = z - H*x, innovation covariance
    /// S = H*P*Ht + R (scalar), gain K = P*Ht/S, then x = x + K*y and
    /// P = (I - K*H)*P. Returns `SingularInnovation` instead of dividing by
    /// a numerically-zero S.
    pub fn correct(&mut self, z: f64) -> Result<(Vector2<f64>, Matrix2<f64>), KalmanError> {
        let innovation = z - (self.measurement * self.state)[(0, 0)];
        let s = (self.measurement * self.covariance * self.measurement.transpose())[(0, 0)]
            + self.measurement_noise;

        if s.abs() < SINGULAR_S_EPS {
            return Err(KalmanError::SingularInnovation);
        }

        let gain = self.covariance * self.measurement.transpose() / s;
        self.state += gain * innovation;
        self.covariance = (Matrix2::identity() - gain * self.measurement) * self.covariance;

        Ok((self.state, self.covariance))
    }

    /// Current position estimate
    pub fn position(&self) -> f64 {
        self.state.x
    }

    /// Current velocity estimate
    pub fn velocity(&self) -> f64 {
        self.state.y
    }

    /// Current state vector [position, velocity]
    pub fn state(&self) -> Vector2<f64> {
        self.state
    }

    /// Current state covariance
    pub fn covariance(&self) -> Matrix2<f64> {
        self.covariance
    }
}

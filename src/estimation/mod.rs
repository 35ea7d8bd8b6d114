// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # State Estimation
//!
//! ## Modules
//!
//! - [`grv`] - Scalar Gaussian random variable and fusion operators.
//! - [`attitude`] - Pitch, pitch rate and yaw rate estimator.
//! - [`calibration`] - Stationary IMU offset and variance calibration.

pub mod attitude;
pub mod calibration;
pub mod grv;

pub use attitude::{AttitudeEstimator, AttitudeState, EstimatorState};
pub use calibration::{CalibrationCode, Calibrator};
pub use grv::Grv;

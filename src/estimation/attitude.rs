// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Body attitude estimation from accelerometer and gyroscope samples.
//!
//! Pitch is tracked with a scalar Kalman filter: every tick the previous estimate is propagated
//! with the gyro rate (smooth, but drifts) and fused with the accelerometer tilt (noisy and
//! disturbed by linear acceleration, but drift-free). The first tick has nothing to propagate and
//! takes the accelerometer tilt directly.
//!
//! Pitch rate is the calibrated gyro-x reading itself. Yaw rate rotates the gyro y/z axes, which
//! tilt with the body, back into the level frame.

use crate::config::ImuCalibration;
use crate::estimation::Grv;
use crate::io::ImuSample;

#[allow(unused_imports)]
use micromath::F32Ext;

/// Filter lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EstimatorState {
    /// No sample seen yet.
    Uninitialized,
    /// Pitch is being propagated and fused every tick.
    Tracking,
}

/// Current attitude estimate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AttitudeState {
    /// Pitch [rad].
    pub pitch: Grv,
    /// Pitch rate [rad/s].
    pub pitch_rate: Grv,
    /// Yaw rate about the level-frame vertical [rad/s].
    pub yaw_rate: f32,
}

/// Pitch / pitch rate / yaw rate estimator. Call [`update`](Self::update) once per control tick.
pub struct AttitudeEstimator {
    /// Sensor noise variances.
    cal: ImuCalibration,
    /// Control period [s].
    dt: f32,

    state: EstimatorState,
    attitude: AttitudeState,
}

impl AttitudeEstimator {
    pub fn new(cal: ImuCalibration, dt: f32) -> Self {
        Self {
            cal,
            dt,
            state: EstimatorState::Uninitialized,
            attitude: AttitudeState::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> EstimatorState {
        self.state
    }

    #[inline]
    pub fn attitude(&self) -> &AttitudeState {
        &self.attitude
    }

    /// Pitch estimate [rad].
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.attitude.pitch.mean
    }

    /// Pitch rate [rad/s].
    #[inline]
    pub fn pitch_rate(&self) -> f32 {
        self.attitude.pitch_rate.mean
    }

    /// Yaw rate [rad/s].
    #[inline]
    pub fn yaw_rate(&self) -> f32 {
        self.attitude.yaw_rate
    }

    /// Accelerometer-only pitch for one sample.
    pub fn pitch_from_accel(&self, sample: &ImuSample) -> Grv {
        let acc_y = Grv::new(sample.acc_y, self.cal.acc_y_var);
        let acc_z = Grv::new(sample.acc_z, self.cal.acc_z_var);
        Grv::atan2(acc_y, acc_z)
    }

    /// Fold one calibrated sample into the estimate.
    pub fn update(&mut self, sample: &ImuSample) -> &AttitudeState {
        let pitch_acc = self.pitch_from_accel(sample);
        let pitch_rate = Grv::new(sample.gyr_x, self.cal.gyr_x_var);

        let pitch = match self.state {
            EstimatorState::Uninitialized => {
                self.state = EstimatorState::Tracking;
                pitch_acc
            }
            EstimatorState::Tracking => {
                let pitch_gyr = self.attitude.pitch + pitch_rate.scale(self.dt);
                Grv::fuse(pitch_gyr, pitch_acc)
            }
        };

        let yaw_rate = sample.gyr_z * pitch.mean.cos() + sample.gyr_y * pitch.mean.sin();

        self.attitude = AttitudeState {
            pitch,
            pitch_rate,
            yaw_rate,
        };
        &self.attitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const G: f32 = 9.81;
    const DT: f32 = 0.01;

    fn cal() -> ImuCalibration {
        ImuCalibration {
            gyr_x_var: 1e-6,
            acc_y_var: 1e-3,
            acc_z_var: 1.5e-3,
            ..ImuCalibration::UNCALIBRATED
        }
    }

    fn tilted(pitch: f32, gyr_x: f32) -> ImuSample {
        ImuSample {
            acc_y: G * pitch.sin(),
            acc_z: G * pitch.cos(),
            gyr_x,
            ..Default::default()
        }
    }

    #[test]
    fn first_tick_uses_accelerometer_only() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        assert_eq!(est.state(), EstimatorState::Uninitialized);

        let sample = ImuSample {
            acc_z: G,
            gyr_x: 5.0,
            gyr_y: 1.0,
            ..Default::default()
        };
        est.update(&sample);
        assert_eq!(est.state(), EstimatorState::Tracking);
        assert_abs_diff_eq!(est.pitch(), 0.0);
        assert_eq!(est.attitude().pitch, est.pitch_from_accel(&sample));
    }

    #[test]
    fn first_tick_picks_up_static_tilt() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        est.update(&tilted(0.3, 0.0));
        assert_relative_eq!(est.pitch(), 0.3, max_relative = 1e-5);
    }

    #[test]
    fn fusion_reduces_uncertainty() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        est.update(&tilted(0.0, 0.0));
        let first = est.attitude().pitch.var;
        for _ in 0..50 {
            est.update(&tilted(0.0, 0.0));
        }
        let settled = est.attitude().pitch.var;
        assert!(settled < first);
        assert!(settled > 0.0);
    }

    #[test]
    fn gyro_carries_pitch_between_accel_samples() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        for _ in 0..200 {
            est.update(&tilted(0.0, 0.0));
        }
        // Accelerometer still reads level, but the gyro says we are rotating. A converged filter
        // trusts the gyro more, so the estimate follows the integrated rate.
        let rate = 1.0;
        est.update(&tilted(0.0, rate));
        let pitch = est.pitch();
        assert!(pitch > 0.5 * rate * DT);
        assert!(pitch < rate * DT);
    }

    #[test]
    fn tracks_constant_rotation() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        let rate = 0.5;
        let mut truth = 0.0;
        est.update(&tilted(truth, rate));
        for _ in 0..100 {
            truth += rate * DT;
            est.update(&tilted(truth, rate));
        }
        assert_abs_diff_eq!(est.pitch(), truth, epsilon = 1e-3);
    }

    #[test]
    fn pitch_rate_is_the_raw_gyro_reading() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        est.update(&tilted(0.1, 0.7));
        est.update(&tilted(0.1, -0.2));
        assert_eq!(est.pitch_rate(), -0.2);
        assert_eq!(est.attitude().pitch_rate.var, cal().gyr_x_var);
    }

    #[test]
    fn yaw_rate_level_is_gyro_z() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        est.update(&ImuSample {
            acc_z: G,
            gyr_y: 0.4,
            gyr_z: 1.5,
            ..Default::default()
        });
        assert_relative_eq!(est.yaw_rate(), 1.5, max_relative = 1e-5);
    }

    #[test]
    fn yaw_rate_compensates_pitch() {
        let mut est = AttitudeEstimator::new(cal(), DT);
        let pitch: f32 = 0.5;
        let yaw: f32 = 2.0;
        // Pure yaw seen by body axes tilted by `pitch`.
        est.update(&ImuSample {
            acc_y: G * pitch.sin(),
            acc_z: G * pitch.cos(),
            gyr_y: yaw * pitch.sin(),
            gyr_z: yaw * pitch.cos(),
            ..Default::default()
        });
        assert_relative_eq!(est.yaw_rate(), yaw, max_relative = 1e-4);
    }
}

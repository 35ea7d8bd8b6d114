// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Hardware Interfaces
//!
//! Traits at the boundary between the control loop and the hardware. The firmware implements them
//! on top of `drivers` and `hw`; host tests implement them with plain structs.
//!
//! ## Modules
//!
//! - [`encoder`] - Interrupt-shared quadrature counter and wheel odometry.

pub mod encoder;

pub use encoder::{EncoderCounter, QuadEncoder, Wheel};

use crate::protocol::{TeleopCommand, Telemetry};

/// One calibrated IMU reading. Gyro offsets have already been removed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ImuSample {
    /// Acceleration [m/s^2].
    pub acc_x: f32,
    pub acc_y: f32,
    pub acc_z: f32,
    /// Angular rate [rad/s].
    pub gyr_x: f32,
    pub gyr_y: f32,
    pub gyr_z: f32,
}

/// Inertial measurement unit.
pub trait Imu {
    type Error: core::fmt::Debug;

    /// Bring the device up. Failure here is fatal for the robot.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Read one calibrated sample.
    fn read(&mut self) -> Result<ImuSample, Self::Error>;

    /// Read one sample without offset correction, for calibration.
    fn read_raw(&mut self) -> Result<ImuSample, Self::Error>;
}

/// Accumulated wheel angle source.
pub trait WheelEncoder {
    /// Output shaft angle relative to the body [rad], as mounted (no direction correction).
    fn angle(&self) -> f32;
}

/// Drive motor accepting a signed voltage.
///
/// Implementations clamp to their supply rail and apply any mounting direction.
pub trait Motor {
    fn set_voltage(&mut self, volts: f32);
}

/// Teleoperation link.
pub trait Transport {
    /// Return a newly received command, if a complete one is available.
    fn poll(&mut self) -> Option<TeleopCommand>;

    /// Report state back to the operator.
    fn send(&mut self, telemetry: &Telemetry);
}

/// Fault lamp.
pub trait StatusIndicator {
    fn set_fault(&mut self, fault: bool);
}

/// Free-running period timer.
pub trait Clock {
    /// Restart the elapsed-time measurement.
    fn reset(&mut self);

    /// Seconds since the last [`reset`](Self::reset).
    fn elapsed(&self) -> f32;
}

impl<T: WheelEncoder + ?Sized> WheelEncoder for &T {
    fn angle(&self) -> f32 {
        (**self).angle()
    }
}

impl<T: Motor + ?Sized> Motor for &mut T {
    fn set_voltage(&mut self, volts: f32) {
        (**self).set_voltage(volts)
    }
}

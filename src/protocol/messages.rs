// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Teleoperation messages exchanged with the Bluetooth host.
//!
//! There is no framing beyond fixed sizes: the host sends [`COMMAND_LEN`] bytes and, for every
//! complete command, the robot answers with [`TELEMETRY_LEN`] bytes. All fields are `f32`, little
//! endian.

/// Host -> robot command size in bytes.
pub const COMMAND_LEN: usize = 8;

/// Robot -> host telemetry size in bytes.
pub const TELEMETRY_LEN: usize = 16;

/// Velocity command from the operator. Holds until the next command arrives.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TeleopCommand {
    /// Linear velocity [m/s].
    pub lin_vel: f32,
    /// Yaw velocity [rad/s].
    pub yaw_vel: f32,
}

impl TeleopCommand {
    pub const STOP: Self = Self {
        lin_vel: 0.0,
        yaw_vel: 0.0,
    };

    /// Decode a command frame. Returns `None` if either field is not finite.
    pub fn decode(bytes: &[u8; COMMAND_LEN]) -> Option<Self> {
        let lin_vel = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let yaw_vel = f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if !lin_vel.is_finite() || !yaw_vel.is_finite() {
            return None;
        }
        Some(Self { lin_vel, yaw_vel })
    }

    pub fn encode(&self) -> [u8; COMMAND_LEN] {
        let mut buf = [0u8; COMMAND_LEN];
        buf[0..4].copy_from_slice(&self.lin_vel.to_le_bytes());
        buf[4..8].copy_from_slice(&self.yaw_vel.to_le_bytes());
        buf
    }
}

/// State reported back to the operator.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Telemetry {
    /// Estimated linear velocity [m/s].
    pub lin_vel: f32,
    /// Estimated yaw rate [rad/s].
    pub yaw_vel: f32,
    /// Left motor voltage command [V].
    pub v_cmd_left: f32,
    /// Right motor voltage command [V].
    pub v_cmd_right: f32,
}

impl Telemetry {
    pub fn encode(&self) -> [u8; TELEMETRY_LEN] {
        let mut buf = [0u8; TELEMETRY_LEN];
        let fields = [self.lin_vel, self.yaw_vel, self.v_cmd_left, self.v_cmd_right];
        for (chunk, value) in buf.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        buf
    }
}

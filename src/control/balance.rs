// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Balance and yaw control law.
//!
//! The average wheel voltage is a linear state-feedback law around the upright equilibrium plus a
//! back-EMF feedforward for the commanded speed. The wheel voltage differential comes from a yaw
//! rate PID with its own feedforward. Both wheels are cut to zero once the body pitches past the
//! tip-over angle.
//!
//! Typical usage pattern:
//!
//! ```no_run
//! # use balbot::control::{BalanceController, ControlInput};
//! # let input = ControlInput::default();
//! let mut controller = BalanceController::new(balbot::config::BALANCE);
//!
//! loop {
//!     let out = controller.update(&input);
//!     // left.set_voltage(out.v_cmd_left); right.set_voltage(out.v_cmd_right);
//! #   break;
//! }
//! ```

use log::{info, warn};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::control::pid::{Pid, PidGains};
use crate::control::Limiter;

/// Controller constants. See [`crate::config::BALANCE`] for the values flashed to the robot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BalanceConfig {
    /// Control period [s].
    pub dt: f32,
    /// Supply rail; every voltage command is bounded by `±supply_voltage` [V].
    pub supply_voltage: f32,
    /// Wheel radius [m].
    pub wheel_radius: f32,
    /// Motor voltage constant [V/(rad/s)].
    pub kv: f32,
    /// Gain on negative pitch rate [V/(rad/s)].
    pub k_pitch_rate: f32,
    /// Gain on negative pitch [V/rad].
    pub k_pitch: f32,
    /// Gain on linear velocity error [V/(m/s)].
    pub k_lin_vel: f32,
    /// Yaw feedforward [V/(rad/s)].
    pub k_yaw_ff: f32,
    /// Yaw rate PID gains.
    pub yaw_pid: PidGains,
    /// Pitch magnitude past which both wheels are cut [rad].
    pub tip_over_angle: f32,
}

/// Per-tick controller inputs.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ControlInput {
    /// Pitch estimate [rad].
    pub pitch: f32,
    /// Pitch rate [rad/s].
    pub pitch_rate: f32,
    /// Yaw rate estimate [rad/s].
    pub yaw_rate: f32,
    /// Left wheel angular velocity [rad/s].
    pub wheel_vel_left: f32,
    /// Right wheel angular velocity [rad/s].
    pub wheel_vel_right: f32,
    /// Commanded linear velocity [m/s].
    pub lin_vel_cmd: f32,
    /// Commanded yaw velocity [rad/s].
    pub yaw_vel_cmd: f32,
}

/// Wheel voltage commands for one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ControlOutput {
    /// Left motor voltage [V].
    pub v_cmd_left: f32,
    /// Right motor voltage [V].
    pub v_cmd_right: f32,
}

impl ControlOutput {
    pub const ZERO: Self = Self {
        v_cmd_left: 0.0,
        v_cmd_right: 0.0,
    };
}

/// Balance and yaw controller. Call [`update`](Self::update) once per control tick.
pub struct BalanceController {
    cfg: BalanceConfig,
    yaw_pid: Pid,
    limiter_left: Limiter,
    limiter_right: Limiter,

    /// Linear velocity estimate from the last update [m/s].
    lin_vel: f32,
    /// Last commands produced.
    output: ControlOutput,
    tipped: bool,
}

impl BalanceController {
    pub fn new(cfg: BalanceConfig) -> Self {
        let vb = cfg.supply_voltage;
        Self {
            cfg,
            yaw_pid: Pid::from_gains(cfg.yaw_pid).with_symmetric_limit(vb),
            limiter_left: Limiter::symmetric(vb),
            limiter_right: Limiter::symmetric(vb),
            lin_vel: 0.0,
            output: ControlOutput::ZERO,
            tipped: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &BalanceConfig {
        &self.cfg
    }

    /// Linear velocity estimate [m/s].
    #[inline]
    pub fn lin_vel(&self) -> f32 {
        self.lin_vel
    }

    /// Commands from the last update.
    #[inline]
    pub fn output(&self) -> ControlOutput {
        self.output
    }

    /// True while the tip-over cutoff is holding the motors at zero.
    #[inline]
    pub fn is_tipped(&self) -> bool {
        self.tipped
    }

    /// Run one control step.
    pub fn update(&mut self, input: &ControlInput) -> ControlOutput {
        let cfg = &self.cfg;
        let vb = cfg.supply_voltage;

        // Linear velocity from mean wheel speed
        self.lin_vel = 0.5 * (input.wheel_vel_left + input.wheel_vel_right) * cfg.wheel_radius;

        // Steady-state voltage to hold the commanded wheel speed
        let v_ff = cfg.kv * input.lin_vel_cmd / cfg.wheel_radius;

        // State feedback around upright
        let v_fb = cfg.k_pitch_rate * -input.pitch_rate
            + cfg.k_pitch * -input.pitch
            + cfg.k_lin_vel * (input.lin_vel_cmd - self.lin_vel);

        let v_avg = (v_ff + v_fb).clamp(-vb, vb);

        // Yaw: feedforward injected into the rate PID
        let yaw_ff = cfg.k_yaw_ff * input.yaw_vel_cmd;
        let v_yaw = self.yaw_pid.update_with_feedforward(
            input.yaw_vel_cmd,
            input.yaw_rate,
            cfg.dt,
            yaw_ff,
        );

        let mut out = ControlOutput {
            v_cmd_left: self.limiter_left.update(v_avg - v_yaw),
            v_cmd_right: self.limiter_right.update(v_avg + v_yaw),
        };

        // Tip-over cutoff, re-evaluated every tick
        let tipped = input.pitch.abs() > cfg.tip_over_angle;
        if tipped != self.tipped {
            if tipped {
                warn!("tip-over: pitch {} rad, motors cut", input.pitch);
            } else {
                info!("pitch back within {} rad, motors re-enabled", cfg.tip_over_angle);
            }
            self.tipped = tipped;
        }
        if tipped {
            out = ControlOutput::ZERO;
        }

        self.output = out;
        out
    }
}

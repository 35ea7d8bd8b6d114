// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Generic PID controller for closed-loop control.
//!
//! Works in `no_std` and does not allocate memory.

/// PID gain set, kept separate from controller state so it can live in `const` configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// PID controller with tunable gains, output clamping and feedforward injection.
#[derive(Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Integrator state
    integral: f32,
    /// Last process variable (for derivative term)
    prev_measurement: f32,

    /// Output clamp
    out_min: f32,
    out_max: f32,

    /// Integral anti-windup clamp
    int_min: f32,
    int_max: f32,

    first_update: bool,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            integral: 0.0,
            prev_measurement: 0.0,

            out_min: -1.0,
            out_max: 1.0,

            int_min: -1.0,
            int_max: 1.0,

            first_update: true,
        }
    }

    /// Create a controller from a [`PidGains`] set.
    pub fn from_gains(gains: PidGains) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd)
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Set integral limits for anti-windup.
    pub fn with_integral_limits(mut self, min: f32, max: f32) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Use the same symmetric bound for both the output and the integrator.
    pub fn with_symmetric_limit(self, limit: f32) -> Self {
        self.with_output_limits(-limit, limit)
            .with_integral_limits(-limit, limit)
    }

    /// Current integrator value (already multiplied by `ki`).
    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Update the controller.
    ///
    /// `setpoint`: desired value
    /// `measurement`: current value
    /// `dt`: timestep in seconds (e.g. 0.01 for 100 Hz control loop)
    ///
    /// Returns a command in [`out_min`, `out_max`].
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        self.update_with_feedforward(setpoint, measurement, dt, 0.0)
    }

    /// Update the controller with an open-loop term added before the output clamp.
    ///
    /// The feedforward shares the output bound with the feedback terms, so a feedforward already
    /// at the limit leaves no headroom for correction.
    pub fn update_with_feedforward(
        &mut self,
        setpoint: f32,
        measurement: f32,
        dt: f32,
        feedforward: f32,
    ) -> f32 {
        let error = setpoint - measurement;

        // ----- P term -----
        let p = self.kp * error;

        // ----- I term -----
        self.integral = (self.integral + error * dt * self.ki).clamp(self.int_min, self.int_max);
        let i = self.integral;

        // ----- D term (on measurement to reduce noise sensitivity) -----
        let d = if self.first_update {
            self.first_update = false;
            0.0
        } else {
            let dv = self.prev_measurement - measurement;
            self.kd * (dv / dt)
        };
        self.prev_measurement = measurement;

        // ----- Output clamp -----
        (feedforward + p + i + d).clamp(self.out_min, self.out_max)
    }
}

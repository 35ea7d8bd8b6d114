// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Brushed DC motor on a two-input H-bridge with a PWM enable.
//!
//! The sign of the commanded voltage selects which input is driven high; its magnitude sets the
//! PWM duty as a fraction of the supply voltage. Zero volts opens both inputs (coast).

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

use crate::io::Motor;

#[allow(unused_imports)]
use micromath::F32Ext;

/// Logical bridge state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Direction {
    Forward,
    Reverse,
    Coast,
}

pub struct HBridge<PWM, FWD, REV> {
    pwm: PWM,
    fwd: FWD,
    rev: REV,
    /// Mounting direction, +1.0 or -1.0.
    direction: f32,
    /// Supply voltage [V].
    supply: f32,
    /// Last applied voltage after direction and clamping [V].
    applied: f32,
}

impl<PWM, FWD, REV> HBridge<PWM, FWD, REV>
where
    PWM: PwmPin<Duty = u16>,
    FWD: OutputPin,
    REV: OutputPin,
{
    /// Construct a bridge in the coasting state with the PWM channel enabled at zero duty.
    pub fn new(mut pwm: PWM, fwd: FWD, rev: REV, direction: f32, supply: f32) -> Self {
        pwm.set_duty(0);
        pwm.enable();

        let mut bridge = Self {
            pwm,
            fwd,
            rev,
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            supply,
            applied: 0.0,
        };
        bridge.set_direction(Direction::Coast);
        bridge
    }

    pub fn set_direction(&mut self, dir: Direction) {
        match dir {
            Direction::Forward => {
                self.rev.set_low().ok();
                self.fwd.set_high().ok();
            }
            Direction::Reverse => {
                self.fwd.set_low().ok();
                self.rev.set_high().ok();
            }
            Direction::Coast => {
                self.fwd.set_low().ok();
                self.rev.set_low().ok();
            }
        }
    }

    /// Drive with a signed voltage, clamped to the supply.
    pub fn drive(&mut self, volts: f32) {
        let v = (self.direction * volts).clamp(-self.supply, self.supply);
        self.applied = v;

        let dir = if v > 0.0 {
            Direction::Forward
        } else if v < 0.0 {
            Direction::Reverse
        } else {
            Direction::Coast
        };
        self.set_direction(dir);

        let max = self.pwm.get_max_duty();
        let frac = v.abs() / self.supply;
        self.pwm.set_duty((frac * max as f32) as u16);
    }

    /// Last applied voltage after direction and clamping [V].
    #[inline]
    pub fn applied(&self) -> f32 {
        self.applied
    }

    pub fn free(self) -> (PWM, FWD, REV) {
        (self.pwm, self.fwd, self.rev)
    }
}

impl<PWM, FWD, REV> Motor for HBridge<PWM, FWD, REV>
where
    PWM: PwmPin<Duty = u16>,
    FWD: OutputPin,
    REV: OutputPin,
{
    fn set_voltage(&mut self, volts: f32) {
        self.drive(volts);
    }
}

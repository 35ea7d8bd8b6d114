// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED.
//!
//! Lit when the robot is in a fault state: tipped over, or halted after a failed bring-up.

use embedded_hal::digital::v2::OutputPin;

use crate::io::StatusIndicator;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED abstraction that remembers its active level and last known state.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.set(false);
        led
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        let high = on == (self.active == ActiveLevel::High);
        if high {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.is_on = on;
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

impl<PIN: OutputPin> StatusIndicator for Led<PIN> {
    fn set_fault(&mut self, fault: bool) {
        if fault != self.is_on {
            self.set(fault);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct FakePin {
        high: bool,
        writes: u32,
    }

    impl OutputPin for FakePin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn starts_off_for_either_polarity() {
        let led = Led::active_high(FakePin::default());
        assert!(!led.is_on());
        assert!(!led.free().high);

        let led = Led::active_low(FakePin::default());
        assert!(led.free().high);
    }

    #[test]
    fn fault_lights_active_low_led() {
        let mut led = Led::active_low(FakePin::default());
        led.set_fault(true);
        assert!(led.is_on());
        assert!(!led.free().high);
    }

    #[test]
    fn repeated_fault_does_not_rewrite_pin() {
        let mut led = Led::active_high(FakePin::default());
        led.set_fault(true);
        led.set_fault(true);
        led.set_fault(false);
        // One write at construction, one per change.
        assert_eq!(led.free().writes, 3);
    }
}

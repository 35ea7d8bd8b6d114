// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Loop period timer on the Cortex-M DWT cycle counter.
//!
//! The counter wraps every 2^32 cycles (about 20 s at 216 MHz), far longer than one period.

use cortex_m::peripheral::{DCB, DWT};

use crate::io::Clock;

pub struct CycleClock {
    start: u32,
    hz: f32,
}

impl CycleClock {
    /// Enable the cycle counter. `sysclk_hz` is the core clock frequency.
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, sysclk_hz: u32) -> Self {
        dcb.enable_trace();
        DWT::unlock();
        dwt.enable_cycle_counter();
        Self {
            start: DWT::cycle_count(),
            hz: sysclk_hz as f32,
        }
    }
}

impl Clock for CycleClock {
    fn reset(&mut self) {
        self.start = DWT::cycle_count();
    }

    fn elapsed(&self) -> f32 {
        DWT::cycle_count().wrapping_sub(self.start) as f32 / self.hz
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wheel encoder pin-change interrupts.
//!
//! Both encoders sit on GPIOE and trigger on both edges of both channels. Line 9 lands in
//! `EXTI9_5` and lines 11, 13, 14 in `EXTI15_10`; both handlers call [`on_exti`] and must run at
//! the same priority so each counter keeps a single writer.

use stm32f7xx_hal::pac;

use crate::io::EncoderCounter;

pub static LEFT: EncoderCounter = EncoderCounter::new();
pub static RIGHT: EncoderCounter = EncoderCounter::new();

// GPIOE line numbers
pub const LEFT_A: u32 = 9;
pub const LEFT_B: u32 = 11;
pub const RIGHT_A: u32 = 13;
pub const RIGHT_B: u32 = 14;

const LEFT_MASK: u32 = (1 << LEFT_A) | (1 << LEFT_B);
const RIGHT_MASK: u32 = (1 << RIGHT_A) | (1 << RIGHT_B);

#[inline]
fn levels() -> u32 {
    // SAFETY: read-only access to the input data register.
    unsafe { (*pac::GPIOE::ptr()).idr.read().bits() }
}

#[inline]
fn bit(word: u32, n: u32) -> bool {
    word & (1 << n) != 0
}

/// Zero both counts and latch the current channel levels. Call before unmasking the EXTI
/// interrupts.
pub fn latch() {
    let idr = levels();
    for (counter, a, b) in [(&LEFT, LEFT_A, LEFT_B), (&RIGHT, RIGHT_A, RIGHT_B)] {
        counter.reset();
        counter.init(bit(idr, a), bit(idr, b));
    }
}

/// Service pending encoder lines. Call from `EXTI9_5` and `EXTI15_10`.
pub fn on_exti() {
    // SAFETY: PR is write-one-to-clear; only our lines are written.
    let exti = unsafe { &*pac::EXTI::ptr() };
    let pending = exti.pr.read().bits() & (LEFT_MASK | RIGHT_MASK);
    if pending == 0 {
        return;
    }
    exti.pr.write(|w| unsafe { w.bits(pending) });

    let idr = levels();
    if pending & LEFT_MASK != 0 {
        LEFT.on_edge(bit(idr, LEFT_A), bit(idr, LEFT_B));
    }
    if pending & RIGHT_MASK != 0 {
        RIGHT.on_edge(bit(idr, RIGHT_A), bit(idr, RIGHT_B));
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quadrature encoder counting shared between pin-change interrupts and the control loop.
//!
//! [`EncoderCounter`] is written only by the channel A/B interrupt handlers of one wheel and read
//! by the control loop once per tick. Both handlers of a wheel must run at the same interrupt
//! priority so they never preempt each other; the counter then has a single writer at any time
//! and can be updated with plain loads and stores, which also works on cores without
//! read-modify-write atomics. The count is 32 bits wide, so a snapshot never tears.
//!
//! [`Wheel`] turns the accumulated angle into ground-frame wheel angle and velocity.

use core::f32::consts::PI;
use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use crate::control::Differentiator;
use crate::io::WheelEncoder;

/// Count delta indexed by `(prev_state << 2) | new_state`, state = `(A << 1) | B`.
///
/// Forward rotation walks 00 -> 01 -> 11 -> 10. Transitions that flip both channels at once are
/// invalid and count as zero.
const QDEC: [i8; 16] = [0, 1, -1, 0, -1, 0, 0, 1, 1, 0, 0, -1, 0, -1, 1, 0];

/// Tick counter updated from encoder interrupts.
pub struct EncoderCounter {
    count: AtomicI32,
    state: AtomicU8,
}

impl EncoderCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicI32::new(0),
            state: AtomicU8::new(0),
        }
    }

    /// Latch the initial channel levels without counting.
    pub fn init(&self, a: bool, b: bool) {
        self.state.store(Self::encode(a, b), Ordering::Relaxed);
    }

    /// Handle an edge on either channel. Call from interrupt context with the current levels.
    #[inline]
    pub fn on_edge(&self, a: bool, b: bool) {
        let new = Self::encode(a, b);
        let prev = self.state.load(Ordering::Relaxed);
        self.state.store(new, Ordering::Relaxed);

        let delta = QDEC[((prev << 2) | new) as usize] as i32;
        if delta != 0 {
            let count = self.count.load(Ordering::Relaxed);
            self.count.store(count.wrapping_add(delta), Ordering::Release);
        }
    }

    /// Snapshot of the accumulated count.
    #[inline]
    pub fn count(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }

    /// Zero the count. Only call while the encoder interrupts are masked.
    pub fn reset(&self) {
        self.count.store(0, Ordering::Release);
    }

    #[inline]
    fn encode(a: bool, b: bool) -> u8 {
        ((a as u8) << 1) | (b as u8)
    }
}

impl Default for EncoderCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a shared counter into an output shaft angle.
pub struct QuadEncoder<'a> {
    counter: &'a EncoderCounter,
    /// Counts per output shaft revolution.
    counts_per_rev: f32,
}

impl<'a> QuadEncoder<'a> {
    pub fn new(counter: &'a EncoderCounter, counts_per_rev: f32) -> Self {
        Self {
            counter,
            counts_per_rev,
        }
    }

    #[inline]
    pub fn count(&self) -> i32 {
        self.counter.count()
    }
}

impl WheelEncoder for QuadEncoder<'_> {
    fn angle(&self) -> f32 {
        self.counter.count() as f32 * (2.0 * PI) / self.counts_per_rev
    }
}

/// Wheel odometry in the ground frame.
///
/// The encoder measures the wheel relative to the body, so body pitch is subtracted to obtain the
/// wheel angle relative to the ground.
pub struct Wheel<E> {
    encoder: E,
    /// Mounting direction [+1, -1].
    direction: f32,
    diff: Differentiator,

    angle: f32,
    velocity: f32,
}

impl<E: WheelEncoder> Wheel<E> {
    /// `f_ctrl` is the rate at which [`update`](Self::update) is called.
    pub fn new(encoder: E, direction: f32, f_ctrl: f32) -> Self {
        Self {
            encoder,
            direction,
            diff: Differentiator::new(f_ctrl),
            angle: 0.0,
            velocity: 0.0,
        }
    }

    /// Sample the encoder. `pitch` is the body pitch estimate for this tick [rad].
    pub fn update(&mut self, pitch: f32) {
        self.angle = self.direction * self.encoder.angle() - pitch;
        self.velocity = self.diff.update(self.angle);
    }

    /// Wheel angle [rad].
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Wheel angular velocity [rad/s].
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

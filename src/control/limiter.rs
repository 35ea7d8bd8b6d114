// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Output limiter for actuator commands.
//!
//! Clamps every sample to `[min, max]`.

/// Saturating limiter.
#[derive(Clone, Debug)]
pub struct Limiter {
    min: f32,
    max: f32,
}

impl Limiter {
    /// Pure clamp to `[min, max]`.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp to `[-limit, limit]`.
    pub fn symmetric(limit: f32) -> Self {
        Self::new(-limit, limit)
    }

    /// Limit one sample.
    #[inline]
    pub fn update(&self, input: f32) -> f32 {
        input.clamp(self.min, self.max)
    }
}

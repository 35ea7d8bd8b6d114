// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Backward-difference differentiator for fixed-rate signals.

/// `y[n] = (x[n] - x[n-1]) * f_s`. The first sample outputs zero.
#[derive(Clone, Debug)]
pub struct Differentiator {
    f_s: f32,
    prev: Option<f32>,
}

impl Differentiator {
    /// Create a differentiator for a signal sampled at `f_s` Hz.
    pub fn new(f_s: f32) -> Self {
        Self { f_s, prev: None }
    }

    pub fn update(&mut self, x: f32) -> f32 {
        let y = match self.prev {
            Some(prev) => (x - prev) * self.f_s,
            None => 0.0,
        };
        self.prev = Some(x);
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_sample_is_zero() {
        let mut d = Differentiator::new(100.0);
        assert_eq!(d.update(5.0), 0.0);
    }

    #[test]
    fn ramp_gives_constant_slope() {
        let mut d = Differentiator::new(100.0);
        d.update(0.0);
        for k in 1..10 {
            let y = d.update(k as f32 * 0.02);
            assert_relative_eq!(y, 2.0, max_relative = 1e-4);
        }
    }
}

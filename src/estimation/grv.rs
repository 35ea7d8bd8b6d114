// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Gaussian random variable for scalar sensor fusion.
//!
//! A [`Grv`] pairs a mean with a variance. Arithmetic on independent values propagates variance
//! exactly for linear operations and to first order for [`Grv::atan2`]. [`Grv::fuse`] is the scalar
//! Kalman update of two estimates of the same quantity.
//!
//! Works in `no_std` and does not allocate memory.

use core::ops::{Add, Mul};

#[allow(unused_imports)]
use micromath::F32Ext;

/// Scalar estimate with Gaussian uncertainty.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Grv {
    pub mean: f32,
    /// Always `>= 0`.
    pub var: f32,
}

impl Grv {
    /// Create an estimate from a raw measurement and its known sensor variance.
    ///
    /// Negative variances are a configuration error; they are caught in debug builds and folded to
    /// their magnitude otherwise.
    #[inline]
    pub fn new(mean: f32, var: f32) -> Self {
        debug_assert!(var >= 0.0, "variance must be non-negative");
        Self {
            mean,
            var: var.abs(),
        }
    }

    /// Multiply by a constant: `{mean·k, var·k²}`.
    #[inline]
    pub fn scale(self, k: f32) -> Self {
        Self {
            mean: self.mean * k,
            var: self.var * k * k,
        }
    }

    /// Fuse two independent estimates of the same quantity.
    ///
    /// The mean is the variance-weighted average and the variance is the harmonic combination, so
    /// the result is never less certain than either input.
    ///
    /// An input with infinite variance carries no information and is ignored. If neither input
    /// carries information the result is their plain average, still with infinite variance. At
    /// least one input must have a positive variance; two exact inputs divide by zero.
    #[inline]
    pub fn fuse(a: Grv, b: Grv) -> Grv {
        match (a.var.is_infinite(), b.var.is_infinite()) {
            (true, true) => {
                return Grv {
                    mean: 0.5 * (a.mean + b.mean),
                    var: f32::INFINITY,
                }
            }
            (true, false) => return b,
            (false, true) => return a,
            (false, false) => {}
        }
        let var_sum = a.var + b.var;
        Grv {
            mean: (a.mean * b.var + b.mean * a.var) / var_sum,
            var: (a.var * b.var) / var_sum,
        }
    }

    /// `atan2(y, z)` with variance propagated through the local linearization.
    ///
    /// With `r² = y² + z²`: `∂θ/∂y = z / r²` and `∂θ/∂z = -y / r²`.
    pub fn atan2(y: Grv, z: Grv) -> Grv {
        let mean = y.mean.atan2(z.mean);
        let r2 = y.mean * y.mean + z.mean * z.mean;
        if r2 == 0.0 {
            // Direction is undefined at the origin; report no information.
            return Grv {
                mean,
                var: f32::INFINITY,
            };
        }
        let dy = z.mean / r2;
        let dz = -y.mean / r2;
        Grv {
            mean,
            var: dy * dy * y.var + dz * dz * z.var,
        }
    }
}

impl Add for Grv {
    type Output = Grv;

    /// Sum of two independent values. Never add a value to a scaled copy of itself.
    #[inline]
    fn add(self, rhs: Grv) -> Grv {
        Grv {
            mean: self.mean + rhs.mean,
            var: self.var + rhs.var,
        }
    }
}

impl Mul<f32> for Grv {
    type Output = Grv;

    #[inline]
    fn mul(self, k: f32) -> Grv {
        self.scale(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn scale_squares_variance() {
        let g = Grv::new(2.0, 0.5).scale(-3.0);
        assert_relative_eq!(g.mean, -6.0);
        assert_relative_eq!(g.var, 4.5);
        assert_eq!(Grv::new(2.0, 0.5) * -3.0, g);
    }

    #[test]
    fn add_sums_means_and_variances() {
        let g = Grv::new(1.0, 0.25) + Grv::new(-4.0, 0.5);
        assert_relative_eq!(g.mean, -3.0);
        assert_relative_eq!(g.var, 0.75);
    }

    #[test]
    fn fuse_with_self_halves_variance() {
        let a = Grv::new(0.3, 0.02);
        let f = Grv::fuse(a, a);
        assert_relative_eq!(f.mean, 0.3, max_relative = 1e-6);
        assert_relative_eq!(f.var, 0.01, max_relative = 1e-6);
    }

    #[test]
    fn fuse_is_symmetric() {
        let a = Grv::new(0.1, 0.004);
        let b = Grv::new(-0.2, 0.03);
        let ab = Grv::fuse(a, b);
        let ba = Grv::fuse(b, a);
        assert_relative_eq!(ab.mean, ba.mean);
        assert_relative_eq!(ab.var, ba.var);
    }

    #[test]
    fn fuse_never_increases_uncertainty() {
        let cases = [
            (Grv::new(1.0, 1.0), Grv::new(2.0, 1.0)),
            (Grv::new(0.0, 1e-6), Grv::new(5.0, 10.0)),
            (Grv::new(-3.0, 0.0), Grv::new(3.0, 2.0)),
            (Grv::new(0.5, 7.0), Grv::new(0.4, 0.07)),
        ];
        for (a, b) in cases {
            let f = Grv::fuse(a, b);
            assert!(f.var <= a.var.min(b.var));
        }
    }

    #[test]
    fn fuse_trusts_exact_input() {
        let f = Grv::fuse(Grv::new(1.5, 0.0), Grv::new(-2.0, 3.0));
        assert_relative_eq!(f.mean, 1.5);
        assert_relative_eq!(f.var, 0.0);
    }

    #[test]
    fn fuse_weights_by_inverse_variance() {
        // b is three times noisier, so the result sits 3/4 of the way toward a.
        let f = Grv::fuse(Grv::new(0.0, 1.0), Grv::new(4.0, 3.0));
        assert_relative_eq!(f.mean, 1.0, max_relative = 1e-6);
        assert_relative_eq!(f.var, 0.75, max_relative = 1e-6);
    }

    #[test]
    fn atan2_level_reading() {
        let p = Grv::atan2(Grv::new(0.0, 0.001), Grv::new(9.81, 0.002));
        assert_abs_diff_eq!(p.mean, 0.0);
        // Only the y-axis noise contributes at zero pitch.
        assert_relative_eq!(p.var, 0.001 / (9.81 * 9.81), max_relative = 1e-5);
    }

    #[test]
    fn atan2_propagates_both_axes() {
        let (y, z) = (3.0_f32, 4.0_f32);
        let p = Grv::atan2(Grv::new(y, 0.5), Grv::new(z, 0.2));
        let r2 = 25.0;
        let expected = (z / r2) * (z / r2) * 0.5 + (y / r2) * (y / r2) * 0.2;
        assert_relative_eq!(p.mean, y.atan2(z));
        assert_relative_eq!(p.var, expected, max_relative = 1e-5);
    }

    #[test]
    fn atan2_at_origin_carries_no_information() {
        let p = Grv::atan2(Grv::new(0.0, 0.1), Grv::new(0.0, 0.1));
        assert!(p.var.is_infinite());
        // Fusing with an uninformative value leaves the other estimate unchanged.
        let f = Grv::fuse(Grv::new(0.2, 0.01), p);
        assert_relative_eq!(f.mean, 0.2);
    }

    #[test]
    fn fuse_of_two_uninformative_values_is_symmetric() {
        let a = Grv::new(0.0, f32::INFINITY);
        let b = Grv::new(0.5, f32::INFINITY);
        let ab = Grv::fuse(a, b);
        assert_eq!(ab, Grv::fuse(b, a));
        assert_relative_eq!(ab.mean, 0.25);
        assert!(ab.var.is_infinite());
    }
}

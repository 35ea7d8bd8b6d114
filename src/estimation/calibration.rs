// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Stationary IMU calibration.
//!
//! With the robot lying still, the mean gyro reading on each axis is its offset and the spread of
//! every axis is its noise variance. [`Calibrator`] accumulates raw samples with Welford's running
//! update and produces an [`ImuCalibration`] table.

use core::fmt;

use crate::config::ImuCalibration;
use crate::io::ImuSample;

/// Fewest samples that give a sample variance.
pub const MIN_SAMPLES: u32 = 2;

/// Floor for reported variances. A perfectly quiet channel would otherwise report zero and make
/// two exact estimates fuse to 0/0.
pub const MIN_VARIANCE: f32 = 1e-12;

/// Running mean and variance of one channel.
#[derive(Copy, Clone, Debug, Default)]
pub struct RunningStats {
    n: u32,
    mean: f32,
    m2: f32,
}

impl RunningStats {
    pub fn push(&mut self, x: f32) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f32;
        self.m2 += delta * (x - self.mean);
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.n
    }

    #[inline]
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Sample variance (`n - 1` denominator). Zero with fewer than two samples.
    pub fn variance(&self) -> f32 {
        if self.n < 2 {
            0.0
        } else {
            self.m2 / (self.n - 1) as f32
        }
    }
}

/// Accumulates raw (uncorrected) samples into a calibration table.
#[derive(Clone, Debug, Default)]
pub struct Calibrator {
    acc: [RunningStats; 3],
    gyr: [RunningStats; 3],
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, raw: &ImuSample) {
        self.acc[0].push(raw.acc_x);
        self.acc[1].push(raw.acc_y);
        self.acc[2].push(raw.acc_z);
        self.gyr[0].push(raw.gyr_x);
        self.gyr[1].push(raw.gyr_y);
        self.gyr[2].push(raw.gyr_z);
    }

    /// Samples accumulated so far.
    #[inline]
    pub fn count(&self) -> u32 {
        self.gyr[0].count()
    }

    /// Build the table, or `None` with fewer than [`MIN_SAMPLES`] samples.
    pub fn finish(&self) -> Option<ImuCalibration> {
        if self.count() < MIN_SAMPLES {
            return None;
        }
        let var = |s: &RunningStats| s.variance().max(MIN_VARIANCE);
        Some(ImuCalibration {
            gyr_x_cal: self.gyr[0].mean(),
            gyr_y_cal: self.gyr[1].mean(),
            gyr_z_cal: self.gyr[2].mean(),
            gyr_x_var: var(&self.gyr[0]),
            gyr_y_var: var(&self.gyr[1]),
            gyr_z_var: var(&self.gyr[2]),
            acc_x_var: var(&self.acc[0]),
            acc_y_var: var(&self.acc[1]),
            acc_z_var: var(&self.acc[2]),
        })
    }
}

/// Formats a table as Rust source ready to paste into `config.rs`.
pub struct CalibrationCode<'a>(pub &'a ImuCalibration);

impl fmt::Display for CalibrationCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        writeln!(f, "ImuCalibration {{")?;
        writeln!(f, "    gyr_x_cal: {:.10},", c.gyr_x_cal)?;
        writeln!(f, "    gyr_y_cal: {:.10},", c.gyr_y_cal)?;
        writeln!(f, "    gyr_z_cal: {:.10},", c.gyr_z_cal)?;
        writeln!(f, "    gyr_x_var: {:.14},", c.gyr_x_var)?;
        writeln!(f, "    gyr_y_var: {:.14},", c.gyr_y_var)?;
        writeln!(f, "    gyr_z_var: {:.14},", c.gyr_z_var)?;
        writeln!(f, "    acc_x_var: {:.14},", c.acc_x_var)?;
        writeln!(f, "    acc_y_var: {:.14},", c.acc_y_var)?;
        writeln!(f, "    acc_z_var: {:.14},", c.acc_z_var)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn running_stats_match_batch() {
        let xs = [2.0_f32, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut s = RunningStats::default();
        for x in xs {
            s.push(x);
        }
        assert_eq!(s.count(), 8);
        assert_relative_eq!(s.mean(), 5.0, max_relative = 1e-6);
        // Sum of squared deviations is 32.
        assert_relative_eq!(s.variance(), 32.0 / 7.0, max_relative = 1e-6);
    }

    #[test]
    fn single_sample_has_zero_variance() {
        let mut s = RunningStats::default();
        s.push(3.0);
        assert_eq!(s.variance(), 0.0);
    }

    #[test]
    fn gyro_offsets_are_means() {
        let mut cal = Calibrator::new();
        for k in 0..100 {
            let wobble = if k % 2 == 0 { 0.01 } else { -0.01 };
            cal.push(&ImuSample {
                acc_x: wobble,
                acc_y: -wobble,
                acc_z: 9.81 + wobble,
                gyr_x: -0.07 + wobble,
                gyr_y: 0.03,
                gyr_z: 0.01 - wobble,
            });
        }
        assert_eq!(cal.count(), 100);
        let table = cal.finish().unwrap();
        assert_relative_eq!(table.gyr_x_cal, -0.07, max_relative = 1e-4);
        assert_relative_eq!(table.gyr_y_cal, 0.03, max_relative = 1e-4);
        assert_relative_eq!(table.gyr_z_cal, 0.01, max_relative = 1e-3);
        // Constant channel is floored, never zero.
        assert_eq!(table.gyr_y_var, MIN_VARIANCE);
        assert_relative_eq!(table.acc_x_var, 1e-4 * 100.0 / 99.0, max_relative = 1e-3);
    }

    #[test]
    fn code_output_is_pasteable() {
        let text = std::format!("{}", CalibrationCode(&ImuCalibration::UNCALIBRATED));
        assert!(text.starts_with("ImuCalibration {"));
        assert!(text.contains("gyr_x_var: 1.00000000000000,"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn too_few_samples_give_no_table() {
        let mut cal = Calibrator::new();
        assert!(cal.finish().is_none());
        cal.push(&ImuSample::default());
        assert!(cal.finish().is_none());
        cal.push(&ImuSample::default());
        let table = cal.finish().unwrap();
        assert!(table.acc_y_var > 0.0);
        assert!(table.gyr_x_var > 0.0);
    }
}

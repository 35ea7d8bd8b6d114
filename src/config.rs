// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration.
//!
//! Everything the robot needs to know about itself lives here as `const` items: loop timing,
//! drivetrain geometry, motor model, controller gains and the per-unit IMU calibration. Units are
//! selected with the `bot0`..`bot3` Cargo features; building without one uses an uncalibrated
//! table (zero offsets, unit variances) that is safe to run but balances poorly.
//!
//! Regenerate an [`ImuCalibration`] table by flashing a build that starts in
//! [`LoopMode::CalibrateImu`](crate::runtime::LoopMode::CalibrateImu) with the robot lying still.

use crate::control::{BalanceConfig, PidGains};

// ----- Loop timing -----

/// Control frequency [Hz].
pub const F_CTRL: f32 = 100.0;

/// Control period [s].
pub const T_CTRL: f32 = 1.0 / F_CTRL;

/// Loop iterations between debug log lines.
pub const DEBUG_PRINT_DIVIDER: u32 = 25;

/// Samples averaged by the IMU calibration routine.
pub const CALIBRATION_SAMPLES: u32 = 1000;

// ----- Safety -----

/// Pitch magnitude beyond which the robot is considered fallen [rad].
pub const TIP_OVER_ANGLE: f32 = 0.8;

// ----- Geometry -----

/// Wheel radius [m].
pub const WHEEL_RADIUS: f32 = 0.04;

/// Distance between wheel contact points [m].
pub const TRACK_WIDTH: f32 = 0.16;

// ----- Transport -----

/// Bluetooth serial baud rate.
pub const BLUETOOTH_BAUD: u32 = 57_600;

/// Debug serial baud rate.
pub const DEBUG_BAUD: u32 = 115_200;

/// Drive motor model.
pub mod motor {
    /// Battery / supply rail voltage [V].
    pub const VB: f32 = 12.0;
    /// Stall current [A].
    pub const I_ST: f32 = 1.0;
    /// No-load current [A].
    pub const I_NL: f32 = 0.12;
    /// Winding resistance [Ohm].
    pub const R: f32 = 5.4;

    /// Motor mounting direction [+1, -1].
    #[cfg(any(feature = "bot0", feature = "bot1"))]
    pub const DIRECTION: f32 = 1.0;
    #[cfg(not(any(feature = "bot0", feature = "bot1")))]
    pub const DIRECTION: f32 = -1.0;

    /// Gearbox torque ratio.
    #[cfg(any(feature = "bot0", feature = "bot1"))]
    pub const TR: f32 = 30.0;
    #[cfg(not(any(feature = "bot0", feature = "bot1")))]
    pub const TR: f32 = 56.0;

    /// No-load speed at the output shaft [rad/s].
    pub const W_NL: f32 = 1047.0 / TR;
    /// Stall torque [N*m].
    pub const T_ST: f32 = 0.015 * TR;
    /// Voltage constant [V/(rad/s)].
    pub const KV: f32 = (VB - R * I_NL) / W_NL;
    /// Torque constant [N*m/A].
    pub const KT: f32 = T_ST * R / VB;
    /// Encoder resolution at the output shaft [counts/rev].
    pub const ENC_CPR: f32 = 44.0 * TR;
}

// ----- Controller gains -----

/// Balance gain on negative pitch rate [V/(rad/s)].
pub const K_PITCH_RATE: f32 = 1.2;
/// Balance gain on negative pitch [V/rad].
pub const K_PITCH: f32 = 28.0;
/// Gain on linear velocity tracking error [V/(m/s)].
pub const K_LIN_VEL: f32 = 6.0;

/// Yaw feedforward [V/(rad/s)]: back-EMF needed for the wheel speed differential of a turn.
pub const K_YAW_FF: f32 = motor::KV * TRACK_WIDTH / (2.0 * WHEEL_RADIUS);

/// Yaw rate PID gains.
pub const YAW_PID: PidGains = PidGains {
    kp: 1.5,
    ki: 4.0,
    kd: 0.0,
};

/// Full controller configuration assembled from the constants above.
pub const BALANCE: BalanceConfig = BalanceConfig {
    dt: T_CTRL,
    supply_voltage: motor::VB,
    wheel_radius: WHEEL_RADIUS,
    kv: motor::KV,
    k_pitch_rate: K_PITCH_RATE,
    k_pitch: K_PITCH,
    k_lin_vel: K_LIN_VEL,
    k_yaw_ff: K_YAW_FF,
    yaw_pid: YAW_PID,
    tip_over_angle: TIP_OVER_ANGLE,
};

// ----- IMU calibration -----

/// Per-unit IMU offsets and noise variances.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImuCalibration {
    /// Gyroscope offsets [rad/s].
    pub gyr_x_cal: f32,
    pub gyr_y_cal: f32,
    pub gyr_z_cal: f32,
    /// Gyroscope variances [(rad/s)^2].
    pub gyr_x_var: f32,
    pub gyr_y_var: f32,
    pub gyr_z_var: f32,
    /// Accelerometer variances [(m/s^2)^2].
    pub acc_x_var: f32,
    pub acc_y_var: f32,
    pub acc_z_var: f32,
}

impl ImuCalibration {
    /// Zero offsets and unit variances.
    pub const UNCALIBRATED: Self = Self {
        gyr_x_cal: 0.0,
        gyr_y_cal: 0.0,
        gyr_z_cal: 0.0,
        gyr_x_var: 1.0,
        gyr_y_var: 1.0,
        gyr_z_var: 1.0,
        acc_x_var: 1.0,
        acc_y_var: 1.0,
        acc_z_var: 1.0,
    };

    pub const BOT_0: Self = Self {
        gyr_x_cal: -0.073_411_368,
        gyr_y_cal: 0.026_996_46,
        gyr_z_cal: 0.010_101_372,
        gyr_x_var: 0.000_002_283_653_9,
        gyr_y_var: 0.000_002_833_999_4,
        gyr_z_var: 0.000_001_857_513_9,
        acc_x_var: 0.001_127_227_1,
        acc_y_var: 0.000_904_459_04,
        acc_z_var: 0.001_629_598,
    };

    pub const BOT_1: Self = Self {
        gyr_x_cal: 0.000_370_179_33,
        gyr_y_cal: -0.075_884_111,
        gyr_z_cal: -0.019_969_719,
        gyr_x_var: 0.000_002_155_239_8,
        gyr_y_var: 0.000_003_588_513_4,
        gyr_z_var: 0.000_003_166_575_4,
        acc_x_var: 0.000_773_501_64,
        acc_y_var: 0.001_021_863_8,
        acc_z_var: 0.001_296_951_8,
    };

    pub const BOT_2: Self = Self {
        gyr_x_cal: -0.071_999_885,
        gyr_y_cal: 0.016_005_589,
        gyr_z_cal: 0.195_824_88,
        gyr_x_var: 0.000_008_833_721_9,
        gyr_y_var: 0.000_002_276_669_2,
        gyr_z_var: 0.000_002_151_410_4,
        acc_x_var: 0.001_017_984_1,
        acc_y_var: 0.001_071_848_9,
        acc_z_var: 0.002_532_103_6,
    };

    pub const BOT_3: Self = Self {
        gyr_x_cal: -0.046_145_916,
        gyr_y_cal: 0.004_881_574_3,
        gyr_z_cal: -0.015_852_459,
        gyr_x_var: 0.000_003_663_726_1,
        gyr_y_var: 0.000_006_033_959_8,
        gyr_z_var: 0.000_003_717_628_7,
        acc_x_var: 0.001_028_299_8,
        acc_y_var: 0.001_180_713_5,
        acc_z_var: 0.002_191_028_8,
    };
}

/// Calibration table for the unit this firmware is built for. The lowest enabled unit wins.
#[cfg(feature = "bot0")]
pub const IMU: ImuCalibration = ImuCalibration::BOT_0;
#[cfg(all(feature = "bot1", not(feature = "bot0")))]
pub const IMU: ImuCalibration = ImuCalibration::BOT_1;
#[cfg(all(feature = "bot2", not(any(feature = "bot0", feature = "bot1"))))]
pub const IMU: ImuCalibration = ImuCalibration::BOT_2;
#[cfg(all(
    feature = "bot3",
    not(any(feature = "bot0", feature = "bot1", feature = "bot2"))
))]
pub const IMU: ImuCalibration = ImuCalibration::BOT_3;
#[cfg(not(any(feature = "bot0", feature = "bot1", feature = "bot2", feature = "bot3")))]
pub const IMU: ImuCalibration = ImuCalibration::UNCALIBRATED;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_motor_constants_are_consistent() {
        assert_relative_eq!(motor::W_NL * motor::TR, 1047.0, max_relative = 1e-6);
        assert_relative_eq!(
            motor::KV * motor::W_NL + motor::R * motor::I_NL,
            motor::VB,
            max_relative = 1e-6
        );
        assert!(motor::KT > 0.0);
    }

    #[test]
    fn controller_config_uses_supply_rail() {
        assert_eq!(BALANCE.supply_voltage, motor::VB);
        assert_relative_eq!(BALANCE.dt * F_CTRL, 1.0);
        assert!(BALANCE.tip_over_angle > 0.0);
    }

    #[test]
    fn calibration_tables_have_valid_variances() {
        for cal in [
            ImuCalibration::UNCALIBRATED,
            ImuCalibration::BOT_0,
            ImuCalibration::BOT_1,
            ImuCalibration::BOT_2,
            ImuCalibration::BOT_3,
        ] {
            for var in [
                cal.gyr_x_var,
                cal.gyr_y_var,
                cal.gyr_z_var,
                cal.acc_x_var,
                cal.acc_y_var,
                cal.acc_z_var,
            ] {
                assert!(var > 0.0);
            }
        }
    }
}

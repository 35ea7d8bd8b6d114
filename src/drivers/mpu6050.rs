// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! InvenSense MPU-6050 6-axis IMU over I2C.
//!
//! Configured for ±2 g and ±250 °/s full scale. Samples are returned in SI units (m/s² and rad/s)
//! with the configured gyro offsets removed.

use core::f32::consts::PI;

use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::config::ImuCalibration;
use crate::io::{Imu, ImuSample};

/// Default 7-bit address (AD0 low).
pub const ADDRESS: u8 = 0x68;

// Register addresses
pub mod reg {
    pub const SMPLRT_DIV: u8 = 0x19;
    pub const CONFIG: u8 = 0x1A;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

/// Expected `WHO_AM_I` contents.
pub const DEVICE_ID: u8 = 0x68;

/// Standard gravity [m/s^2].
const G: f32 = 9.80665;

/// ±2 g full scale [LSB/g].
const ACC_LSB_PER_G: f32 = 16384.0;

/// ±250 °/s full scale [LSB/(°/s)].
const GYR_LSB_PER_DPS: f32 = 131.0;

/// Error type for `Mpu6050` operations.
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// I2C transaction failed.
    Bus(E),
    /// `WHO_AM_I` returned an unexpected value.
    WrongDevice(u8),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// Gyro offsets subtracted from every sample [rad/s].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GyroOffsets {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<&ImuCalibration> for GyroOffsets {
    fn from(cal: &ImuCalibration) -> Self {
        Self {
            x: cal.gyr_x_cal,
            y: cal.gyr_y_cal,
            z: cal.gyr_z_cal,
        }
    }
}

pub struct Mpu6050<I2C> {
    i2c: I2C,
    addr: u8,
    offsets: GyroOffsets,
}

impl<I2C, E> Mpu6050<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            offsets: GyroOffsets::default(),
        }
    }

    /// Set the gyro offsets removed by [`Imu::read`].
    pub fn with_gyro_offsets(mut self, offsets: GyroOffsets) -> Self {
        self.offsets = offsets;
        self
    }

    /// Release the bus.
    pub fn free(self) -> I2C {
        self.i2c
    }

    /// Wake the device, check its identity and set ranges.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        let id = self.read_reg(reg::WHO_AM_I)?;
        if id != DEVICE_ID {
            return Err(Error::WrongDevice(id));
        }

        // Clear SLEEP, internal oscillator
        self.write_reg(reg::PWR_MGMT_1, 0x00)?;
        // 1 kHz internal rate, ~44 Hz DLPF
        self.write_reg(reg::CONFIG, 0x03)?;
        self.write_reg(reg::SMPLRT_DIV, 0x00)?;
        // ±250 °/s, ±2 g
        self.write_reg(reg::GYRO_CONFIG, 0x00)?;
        self.write_reg(reg::ACCEL_CONFIG, 0x00)?;
        Ok(())
    }

    /// Burst read all axes without offset correction.
    pub fn read_uncorrected(&mut self) -> Result<ImuSample, Error<E>> {
        let mut buf = [0u8; 14];
        self.i2c
            .write_read(self.addr, &[reg::ACCEL_XOUT_H], &mut buf)?;

        let word = |i: usize| i16::from_be_bytes([buf[i], buf[i + 1]]) as f32;
        let acc = |raw: f32| raw / ACC_LSB_PER_G * G;
        let gyr = |raw: f32| raw / GYR_LSB_PER_DPS * (PI / 180.0);

        // Bytes 6..8 hold the die temperature.
        Ok(ImuSample {
            acc_x: acc(word(0)),
            acc_y: acc(word(2)),
            acc_z: acc(word(4)),
            gyr_x: gyr(word(8)),
            gyr_y: gyr(word(10)),
            gyr_z: gyr(word(12)),
        })
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.addr, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c.write(self.addr, &[reg, value])?;
        Ok(())
    }
}

impl<I2C, E> Imu for Mpu6050<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    E: core::fmt::Debug,
{
    type Error = Error<E>;

    fn init(&mut self) -> Result<(), Self::Error> {
        Mpu6050::init(self)
    }

    fn read(&mut self) -> Result<ImuSample, Self::Error> {
        let mut s = self.read_uncorrected()?;
        s.gyr_x -= self.offsets.x;
        s.gyr_y -= self.offsets.y;
        s.gyr_z -= self.offsets.z;
        Ok(s)
    }

    fn read_raw(&mut self) -> Result<ImuSample, Self::Error> {
        self.read_uncorrected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::vec::Vec;

    #[derive(Debug, PartialEq)]
    struct Nack;

    /// Register-file mock: `write_read` serves bytes starting at the requested register.
    struct FakeBus {
        regs: [u8; 128],
        writes: Vec<(u8, u8)>,
        online: bool,
    }

    impl FakeBus {
        fn new() -> Self {
            let mut regs = [0u8; 128];
            regs[reg::WHO_AM_I as usize] = DEVICE_ID;
            Self {
                regs,
                writes: Vec::new(),
                online: true,
            }
        }

        fn set_word(&mut self, reg: u8, value: i16) {
            let [hi, lo] = value.to_be_bytes();
            self.regs[reg as usize] = hi;
            self.regs[reg as usize + 1] = lo;
        }
    }

    impl Write for FakeBus {
        type Error = Nack;

        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Nack> {
            if !self.online || addr != ADDRESS {
                return Err(Nack);
            }
            self.writes.push((bytes[0], bytes[1]));
            self.regs[bytes[0] as usize] = bytes[1];
            Ok(())
        }
    }

    impl WriteRead for FakeBus {
        type Error = Nack;

        fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Nack> {
            if !self.online || addr != ADDRESS {
                return Err(Nack);
            }
            let start = bytes[0] as usize;
            buffer.copy_from_slice(&self.regs[start..start + buffer.len()]);
            Ok(())
        }
    }

    #[test]
    fn init_wakes_and_configures() {
        let mut imu = Mpu6050::new(FakeBus::new(), ADDRESS);
        assert_eq!(imu.init(), Ok(()));
        let bus = imu.free();
        assert_eq!(bus.writes[0], (reg::PWR_MGMT_1, 0x00));
        assert!(bus.writes.contains(&(reg::GYRO_CONFIG, 0x00)));
        assert!(bus.writes.contains(&(reg::ACCEL_CONFIG, 0x00)));
    }

    #[test]
    fn init_fails_when_unreachable() {
        let mut bus = FakeBus::new();
        bus.online = false;
        let mut imu = Mpu6050::new(bus, ADDRESS);
        assert_eq!(imu.init(), Err(Error::Bus(Nack)));
    }

    #[test]
    fn init_rejects_wrong_device() {
        let mut bus = FakeBus::new();
        bus.regs[reg::WHO_AM_I as usize] = 0x71;
        let mut imu = Mpu6050::new(bus, ADDRESS);
        assert_eq!(imu.init(), Err(Error::WrongDevice(0x71)));
    }

    #[test]
    fn read_converts_units_and_removes_offsets() {
        let mut bus = FakeBus::new();
        bus.set_word(reg::ACCEL_XOUT_H + 4, 16384); // +1 g on z
        bus.set_word(reg::ACCEL_XOUT_H + 2, -8192); // -0.5 g on y
        bus.set_word(reg::ACCEL_XOUT_H + 8, 131); // 1 °/s on x
        bus.set_word(reg::ACCEL_XOUT_H + 12, -262); // -2 °/s on z

        let offsets = GyroOffsets {
            x: 0.01,
            y: 0.0,
            z: 0.0,
        };
        let mut imu = Mpu6050::new(bus, ADDRESS).with_gyro_offsets(offsets);

        let raw = imu.read_raw().unwrap();
        assert_relative_eq!(raw.acc_z, G, max_relative = 1e-6);
        assert_relative_eq!(raw.acc_y, -0.5 * G, max_relative = 1e-6);
        assert_relative_eq!(raw.gyr_x, PI / 180.0, max_relative = 1e-5);
        assert_relative_eq!(raw.gyr_z, -2.0 * PI / 180.0, max_relative = 1e-5);

        let s = Imu::read(&mut imu).unwrap();
        assert_relative_eq!(s.gyr_x, PI / 180.0 - 0.01, max_relative = 1e-5);
        assert_eq!(s.acc_z, raw.acc_z);
    }

    #[test]
    fn offsets_from_calibration_table() {
        let o = GyroOffsets::from(&ImuCalibration::BOT_0);
        assert_eq!(o.x, ImuCalibration::BOT_0.gyr_x_cal);
        assert_eq!(o.z, ImuCalibration::BOT_0.gyr_z_cal);
    }
}

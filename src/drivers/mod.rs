// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Drivers sit above the `embedded-hal` traits and implement the collaborator traits in
//! [`crate::io`], so the same code runs against STM32 peripherals and host-side fakes.
//!
//! ## Existing drivers
//!
//! - [`mpu6050`] – InvenSense MPU-6050 accelerometer/gyroscope over I2C
//! - [`hbridge`] – Brushed DC motor on a two-input H-bridge with PWM enable

pub mod hbridge;
pub mod mpu6050;

pub use hbridge::HBridge;
pub use mpu6050::Mpu6050;

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # BalBot Firmware
//!
//! State estimation and balance control for a two-wheeled self-balancing robot, written in Rust,
//! targeting an STM32F767 MCU.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`estimation`] | Uncertain scalars, pitch/yaw-rate estimator, IMU calibration |
//! | [`control`] | PID, limiter, differentiator and the balance/yaw control law |
//! | [`runtime`] | Fixed-rate control loop and its bench modes |
//! | [`io`] | Collaborator traits and interrupt-shared encoder counters |
//! | [`drivers`] | Device-level drivers (MPU-6050, H-bridge) |
//! | [`protocol`] | Teleop command and telemetry frames |
//! | [`hw`] | MCU-level wrappers (LED, USART logger, Bluetooth, DWT clock, encoder EXTI) |
//! | [`config`] | Compile-time tuning and per-unit calibration |
//!
//! Everything except the STM32 glue in [`hw`] builds on the host, so the algorithms are tested
//! with `cargo test`.
//!
//! ## Getting Started
//!
//! Flash the board (pick the unit with `botN`):
//!
//! ```bash
//! cargo run --release --features firmware,bot0
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod estimation;
pub mod hw;
pub mod io;
pub mod protocol;
pub mod runtime;

pub use error::Error;

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides the building blocks of the drive controller.
//!
//! ## Modules
//!
//! - [`pid`] - General-purpose PID controller implementation.
//! - [`limiter`] - Output clamp.
//! - [`diff`] - Fixed-rate differentiator.
//! - [`balance`] - Balance and yaw control law for the two-wheeled base.

pub mod balance;
pub mod diff;
pub mod limiter;
pub mod pid;

pub use balance::{BalanceConfig, BalanceController, ControlInput, ControlOutput};
pub use diff::Differentiator;
pub use limiter::Limiter;
pub use pid::{Pid, PidGains};

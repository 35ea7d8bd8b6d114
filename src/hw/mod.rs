// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU-Level Glue
//!
//! [`led`] and [`log_sink`] build everywhere. The rest wraps STM32F7 peripherals and is compiled
//! with the `firmware` feature.

pub mod led;
pub mod log_sink;

#[cfg(feature = "firmware")]
pub mod bluetooth;
#[cfg(feature = "firmware")]
pub mod clock;
#[cfg(feature = "firmware")]
pub mod encoder;
#[cfg(feature = "firmware")]
pub mod usart;

pub use led::Led;
pub use log_sink::LogSink;

#[cfg(feature = "firmware")]
pub use bluetooth::Bluetooth;
#[cfg(feature = "firmware")]
pub use clock::CycleClock;
#[cfg(feature = "firmware")]
pub use usart::{DebugUsart, Usart};

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod messages;
pub mod parser;

pub use messages::{TeleopCommand, Telemetry, COMMAND_LEN, TELEMETRY_LEN};
pub use parser::FrameDecoder;

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Crate-level error type.
//!
//! Only bring-up can fail. Once the control loop is running every tick completes; a bad sensor
//! read is logged and the previous sample reused.

use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The IMU did not respond or identified as the wrong device.
    ImuInit,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ImuInit => f.write_str("IMU initialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(std::format!("{}", Error::ImuInit), "IMU initialization failed");
    }
}

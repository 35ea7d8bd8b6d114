// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debug USART and the `log` backend that writes through it.
//!
//! To access the terminal on the host machine, connect to the ST-LINK USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::fmt::{self, Write as _};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use nb::block;

use stm32f7xx_hal::{
    pac,
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

use super::log_sink::LogSink;

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    /// Write a string, expanding `\n` to CRLF for the terminal.
    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            if b == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(b);
        }
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

/// USART3 is routed to the ST-LINK virtual COM port on the Nucleo board.
pub type DebugUsart = Usart<pac::USART3>;

/// Interrupts stay enabled while a line is sent. A record logged from an interrupt that lands
/// mid-line is dropped.
struct UsartLogger {
    sink: LogSink<DebugUsart>,
}

static LOGGER: UsartLogger = UsartLogger {
    sink: LogSink::new(),
};

impl Log for UsartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(mut usart) = self.sink.claim() {
            let _ = writeln!(usart, "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        if let Some(mut usart) = self.sink.claim() {
            usart.flush();
        }
    }
}

/// Install the debug USART as the global logger. Can only succeed once.
pub fn init_logger(usart: DebugUsart, level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.sink.install(usart);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

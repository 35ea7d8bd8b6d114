// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Teleop link over an HC-05 style Bluetooth serial module on USART2.
//!
//! The USART has a single-byte receive register, so bytes are drained from the RXNE interrupt
//! into a [`FrameDecoder`]. The control loop only picks up the latest complete command.

use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use log::warn;
use nb::block;

use stm32f7xx_hal::{
    pac,
    prelude::*,
    serial::{Rx, Tx},
};

use crate::io::Transport;
use crate::protocol::{FrameDecoder, TeleopCommand, Telemetry};

struct RxState {
    rx: Rx<pac::USART2>,
    decoder: FrameDecoder,
    latest: Option<TeleopCommand>,
}

static RX: Mutex<RefCell<Option<RxState>>> = Mutex::new(RefCell::new(None));

pub struct Bluetooth {
    tx: Tx<pac::USART2>,
}

impl Bluetooth {
    /// Take both halves of the serial port. The caller enables the RXNE interrupt and unmasks
    /// `USART2` in the NVIC afterwards.
    pub fn new(tx: Tx<pac::USART2>, rx: Rx<pac::USART2>) -> Self {
        interrupt::free(|cs| {
            RX.borrow(cs).replace(Some(RxState {
                rx,
                decoder: FrameDecoder::new(),
                latest: None,
            }))
        });
        Self { tx }
    }
}

/// Drain the receive register. Call from the `USART2` interrupt handler.
pub fn on_rx_interrupt() {
    let error = interrupt::free(|cs| {
        let mut slot = RX.borrow(cs).borrow_mut();
        let state = slot.as_mut()?;
        loop {
            match state.rx.read() {
                Ok(byte) => {
                    if let Some(cmd) = state.decoder.push(byte) {
                        state.latest = Some(cmd);
                    }
                }
                Err(nb::Error::WouldBlock) => return None,
                Err(nb::Error::Other(e)) => {
                    state.decoder.clear();
                    return Some(e);
                }
            }
        }
    });
    // Logged outside the critical section so the transmit runs with interrupts enabled.
    if let Some(e) = error {
        warn!("bluetooth rx error {:?}, resyncing", e);
    }
}

impl Transport for Bluetooth {
    fn poll(&mut self) -> Option<TeleopCommand> {
        let (latest, rejected) = interrupt::free(|cs| {
            RX.borrow(cs)
                .borrow_mut()
                .as_mut()
                .map_or((None, 0), |state| {
                    (state.latest.take(), state.decoder.take_rejected())
                })
        });
        if rejected > 0 {
            warn!("dropped {} teleop frame(s) with non-finite values", rejected);
        }
        latest
    }

    fn send(&mut self, telemetry: &Telemetry) {
        for b in telemetry.encode() {
            let _ = block!(self.tx.write(b));
        }
    }
}

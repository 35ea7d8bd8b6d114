// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-owner slot for the log writer.
//!
//! Writing a line over a blocking UART takes milliseconds at 115200 baud, so the logger must not
//! hold a critical section while it transmits: the encoder and Bluetooth interrupts would stall
//! behind it. A [`LogSink`] hands out the writer through a try-lock instead. A context that finds
//! the sink already claimed (an interrupt that logs while the main loop is mid-line) drops its
//! line and never blocks.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

pub struct LogSink<W> {
    busy: AtomicBool,
    writer: UnsafeCell<Option<W>>,
}

// SAFETY: the writer is only reached through a `SinkGuard`, and `busy` admits one guard at a time.
unsafe impl<W: Send> Sync for LogSink<W> {}

impl<W> LogSink<W> {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            writer: UnsafeCell::new(None),
        }
    }

    /// Store the writer. Returns `false` (and drops `writer`) if the sink is claimed right now.
    pub fn install(&self, writer: W) -> bool {
        if !self.lock() {
            return false;
        }
        // SAFETY: exclusive access held via `busy`.
        unsafe { *self.writer.get() = Some(writer) };
        self.busy.store(false, Ordering::Release);
        true
    }

    /// Borrow the writer, or `None` if it is not installed or already claimed.
    pub fn claim(&self) -> Option<SinkGuard<'_, W>> {
        if !self.lock() {
            return None;
        }
        // SAFETY: exclusive access held via `busy`.
        if unsafe { (*self.writer.get()).is_none() } {
            self.busy.store(false, Ordering::Release);
            return None;
        }
        Some(SinkGuard { sink: self })
    }

    fn lock(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }
}

impl<W> Default for LogSink<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to an installed writer. Releases the sink on drop.
pub struct SinkGuard<'a, W> {
    sink: &'a LogSink<W>,
}

impl<W> Deref for SinkGuard<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        // SAFETY: the guard exists only while `busy` is held and the writer is `Some`.
        match unsafe { &*self.sink.writer.get() } {
            Some(w) => w,
            None => unreachable!(),
        }
    }
}

impl<W> DerefMut for SinkGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        // SAFETY: as in `deref`, and `&mut self` rules out a second borrow through this guard.
        match unsafe { &mut *self.sink.writer.get() } {
            Some(w) => w,
            None => unreachable!(),
        }
    }
}

impl<W> Drop for SinkGuard<'_, W> {
    fn drop(&mut self) {
        self.sink.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write as _;
    use std::string::String;

    #[test]
    fn empty_sink_cannot_be_claimed() {
        let sink: LogSink<String> = LogSink::new();
        assert!(sink.claim().is_none());
        // A failed claim must not leave the sink locked.
        assert!(sink.install(String::new()));
        assert!(sink.claim().is_some());
    }

    #[test]
    fn nested_claim_is_refused_without_blocking() {
        let sink = LogSink::new();
        assert!(sink.install(String::new()));

        let mut outer = sink.claim().unwrap();
        write!(outer, "main").unwrap();

        // An interrupt logging mid-line finds the sink busy and drops its line.
        assert!(sink.claim().is_none());
        assert!(!sink.install(String::from("replaced")));

        drop(outer);
        let mut again = sink.claim().unwrap();
        write!(again, " loop").unwrap();
        assert_eq!(again.as_str(), "main loop");
    }

    #[test]
    fn install_replaces_idle_writer() {
        let sink = LogSink::new();
        assert!(sink.install(String::from("old")));
        assert!(sink.install(String::from("new")));
        assert_eq!(sink.claim().unwrap().as_str(), "new");
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-stream decoder for teleop commands.
//!
//! Bytes are fed one at a time as they arrive on the serial port. Every [`COMMAND_LEN`] bytes
//! form one command. Frames with non-finite values are counted and dropped; the decoder never
//! logs, since it runs inside the receive interrupt.

use crate::protocol::messages::*;

pub struct FrameDecoder {
    buf: [u8; COMMAND_LEN],
    len: usize,
    rejected: u32,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            buf: [0; COMMAND_LEN],
            len: 0,
            rejected: 0,
        }
    }

    /// Drop any partially received frame.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Bytes of the current frame received so far.
    #[inline]
    pub fn pending(&self) -> usize {
        self.len
    }

    /// Frames dropped for non-finite values since the last call.
    pub fn take_rejected(&mut self) -> u32 {
        core::mem::take(&mut self.rejected)
    }

    /// Process a single incoming byte. Returns `Some(TeleopCommand)` when a valid frame completes.
    pub fn push(&mut self, byte: u8) -> Option<TeleopCommand> {
        self.buf[self.len] = byte;
        self.len += 1;
        if self.len < COMMAND_LEN {
            return None;
        }

        self.len = 0;
        let cmd = TeleopCommand::decode(&self.buf);
        if cmd.is_none() {
            self.rejected = self.rejected.saturating_add(1);
        }
        cmd
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(dec: &mut FrameDecoder, bytes: &[u8]) -> Option<TeleopCommand> {
        let mut last = None;
        for &b in bytes {
            if let Some(cmd) = dec.push(b) {
                last = Some(cmd);
            }
        }
        last
    }

    #[test]
    fn decodes_complete_frame() {
        let cmd = TeleopCommand {
            lin_vel: 0.35,
            yaw_vel: -1.25,
        };
        let mut dec = FrameDecoder::new();
        let bytes = cmd.encode();
        assert_eq!(feed(&mut dec, &bytes[..7]), None);
        assert_eq!(dec.pending(), 7);
        assert_eq!(dec.push(bytes[7]), Some(cmd));
        assert_eq!(dec.pending(), 0);
    }

    #[test]
    fn little_endian_layout() {
        // 1.0f32 = 0x3F800000, 2.0f32 = 0x40000000
        let bytes = [0x00, 0x00, 0x80, 0x3F, 0x00, 0x00, 0x00, 0x40];
        let mut dec = FrameDecoder::new();
        assert_eq!(
            feed(&mut dec, &bytes),
            Some(TeleopCommand {
                lin_vel: 1.0,
                yaw_vel: 2.0
            })
        );
    }

    #[test]
    fn rejects_non_finite_and_resyncs_on_next_frame() {
        let mut dec = FrameDecoder::new();
        let mut bad = [0u8; COMMAND_LEN];
        bad[0..4].copy_from_slice(&f32::NAN.to_le_bytes());
        assert_eq!(feed(&mut dec, &bad), None);
        assert_eq!(dec.take_rejected(), 1);
        assert_eq!(dec.take_rejected(), 0);

        let good = TeleopCommand {
            lin_vel: 0.1,
            yaw_vel: 0.0,
        };
        assert_eq!(feed(&mut dec, &good.encode()), Some(good));
    }

    #[test]
    fn clear_discards_partial_frame() {
        let mut dec = FrameDecoder::new();
        feed(&mut dec, &[1, 2, 3]);
        dec.clear();
        let cmd = TeleopCommand::STOP;
        assert_eq!(feed(&mut dec, &cmd.encode()), Some(cmd));
    }

    #[test]
    fn telemetry_layout() {
        let t = Telemetry {
            lin_vel: 1.0,
            yaw_vel: 2.0,
            v_cmd_left: -1.0,
            v_cmd_right: 0.5,
        };
        let bytes = t.encode();
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &(-1.0f32).to_le_bytes());
        assert_eq!(&bytes[12..16], &0.5f32.to_le_bytes());
    }
}

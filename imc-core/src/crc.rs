//! CRC engine contract and a default software implementation.
//!
//! The module core only ever drives a CRC unit through `reset`/`add`/`get`
//! (spec §6), so that a platform with a hardware CRC peripheral can supply
//! its own `CrcEngine` impl without the core caring. [`Crc32`] is the
//! software fallback used by tests and by platforms without CRC hardware,
//! built on the same `crc` crate `node1-firmware`/`node2-firmware` use for
//! their payload checksums.

use crc::{Crc, CRC_32_ISO_HDLC};
use heapless::Vec;

/// Largest number of bytes ever fed to a CRC in one message: a full header
/// plus the largest payload (`4 + 244`).
pub const MAX_CRC_INPUT: usize = 4 + crate::frame::MAX_PAYLOAD as usize;

/// A resettable CRC accumulator, fed one byte at a time.
///
/// Implementations must not retain state across a `reset()` call; the core
/// always resets before accumulating a new frame.
pub trait CrcEngine {
    fn reset(&mut self);
    fn add(&mut self, byte: u8);
    fn get(&self) -> u32;
}

/// Software CRC-32 (ISO-HDLC) accumulator.
///
/// Bytes are buffered since the last `reset()` and the checksum is
/// recomputed on `get()`, avoiding a self-referential `Digest` held across
/// calls while still presenting the byte-at-a-time `CrcEngine` contract.
pub struct Crc32 {
    crc: Crc<u32>,
    buffered: Vec<u8, MAX_CRC_INPUT>,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            crc: Crc::<u32>::new(&CRC_32_ISO_HDLC),
            buffered: Vec::new(),
        }
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl CrcEngine for Crc32 {
    fn reset(&mut self) {
        self.buffered.clear();
    }

    fn add(&mut self, byte: u8) {
        // Silently drops a byte past MAX_CRC_INPUT: the core never feeds more
        // than `4 + size` bytes with `size <= MAX_PAYLOAD`, so this never triggers.
        let _ = self.buffered.push(byte);
    }

    fn get(&self) -> u32 {
        self.crc.checksum(&self.buffered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_previous_accumulation() {
        let mut crc = Crc32::new();
        for b in [1u8, 2, 3] {
            crc.add(b);
        }
        let first = crc.get();

        crc.reset();
        for b in [4u8, 5] {
            crc.add(b);
        }
        let second = crc.get();

        assert_ne!(first, second);

        crc.reset();
        for b in [1u8, 2, 3] {
            crc.add(b);
        }
        assert_eq!(crc.get(), first);
    }

    #[test]
    fn single_bit_flip_changes_checksum() {
        let mut crc = Crc32::new();
        for b in [0x10u8, 0x20, 0x30, 0x40] {
            crc.add(b);
        }
        let original = crc.get();

        crc.reset();
        for b in [0x11u8, 0x20, 0x30, 0x40] {
            crc.add(b);
        }
        assert_ne!(crc.get(), original);
    }
}

//! Single-producer/single-consumer hand-off between three byte buffers.
//!
//! Three fixed-capacity slots rotate through the roles *read* (owned by
//! the consumer), *write* (owned by the producer) and *intermediate*. A
//! swap trades one endpoint's slot for the intermediate one; the
//! intermediate index is an atomic so a swap-read racing a swap-write
//! (receiver ISR `on_idle` vs. main-context `poll_next_frame`) always
//! leaves both sides holding a valid, non-corrupted buffer.

use core::sync::atomic::{AtomicU8, Ordering};
use heapless::Vec;

pub struct TripleBuffer<const N: usize> {
    slots: [Vec<u8, N>; 3],
    read_idx: u8,
    write_idx: u8,
    inter_idx: AtomicU8,
}

impl<const N: usize> TripleBuffer<N> {
    pub fn new() -> Self {
        Self {
            slots: [Vec::new(), Vec::new(), Vec::new()],
            read_idx: 0,
            write_idx: 1,
            inter_idx: AtomicU8::new(2),
        }
    }

    pub fn read(&self) -> &Vec<u8, N> {
        &self.slots[self.read_idx as usize]
    }

    pub fn read_mut(&mut self) -> &mut Vec<u8, N> {
        &mut self.slots[self.read_idx as usize]
    }

    pub fn write_mut(&mut self) -> &mut Vec<u8, N> {
        &mut self.slots[self.write_idx as usize]
    }

    /// Swaps the read slot with the intermediate slot.
    pub fn swap_read(&mut self) {
        self.read_idx = self.swap_with_intermediate(self.read_idx);
    }

    /// Swaps the write slot with the intermediate slot.
    pub fn swap_write(&mut self) {
        self.write_idx = self.swap_with_intermediate(self.write_idx);
    }

    fn swap_with_intermediate(&self, mine: u8) -> u8 {
        let mut observed = self.inter_idx.load(Ordering::Relaxed);
        loop {
            match self.inter_idx.compare_exchange_weak(
                observed,
                mine,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return observed,
                Err(actual) => observed = actual,
            }
        }
    }
}

impl<const N: usize> Default for TripleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

//! Two-slot transmit queue with an enforced inter-frame idle gap.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use heapless::Vec;

use crate::hal::UartPort;

/// Serializes up to two outstanding frames to a [`UartPort`], inserting an
/// idle gap after each so the peer's idle-line framing can delimit them.
pub struct Sender<'a, U: UartPort, const N: usize> {
    uart: &'a mut U,
    staged: Vec<u8, N>,
    has_staged: AtomicBool,
    capacity: AtomicU8,
}

impl<'a, U: UartPort, const N: usize> Sender<'a, U, N> {
    pub fn new(uart: &'a mut U) -> Self {
        Self {
            uart,
            staged: Vec::new(),
            has_staged: AtomicBool::new(false),
            capacity: AtomicU8::new(2),
        }
    }

    /// Number of frames that may still be enqueued (0, 1 or 2).
    pub fn capacity(&self) -> u8 {
        self.capacity.load(Ordering::Acquire)
    }

    /// Enqueues `bytes` for transmission. Returns `false` if both the
    /// UART and the staging slot are already occupied.
    pub fn try_send(&mut self, bytes: &[u8]) -> bool {
        self.uart.suspend_send();
        let accepted = if !self.uart.is_tx_busy() {
            let sent = self.uart.send(bytes);
            if sent {
                self.capacity.store(1, Ordering::Release);
            }
            sent
        } else if self.capacity.load(Ordering::Acquire) > 0 {
            self.staged.clear();
            // `bytes` is always produced by Module from an N-byte frame buffer.
            let _ = self.staged.extend_from_slice(bytes);
            self.has_staged.store(true, Ordering::Release);
            self.capacity.store(0, Ordering::Release);
            true
        } else {
            false
        };
        self.uart.resume_send();
        accepted
    }

    /// Called from UART ISR context when a transmission completes. Requests
    /// the idle gap; the staged frame (if any) starts once it elapses.
    pub fn on_tx_complete(&mut self) {
        self.uart.generate_idle_line();
    }

    /// Called when the idle-gap timer requested by `on_tx_complete` fires.
    pub fn on_idle_gap_elapsed(&mut self) {
        if self.has_staged.load(Ordering::Acquire) {
            self.has_staged.store(false, Ordering::Release);
            let _ = self.uart.send(&self.staged);
        }
        self.capacity.fetch_add(1, Ordering::AcqRel);
    }
}

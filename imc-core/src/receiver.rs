//! Idle-delimited frame accumulation, interrupt-context producer / main-context consumer.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::triple_buffer::TripleBuffer;

/// Accumulates bytes into frames on idle-line boundaries, queuing up to two
/// complete frames for the main loop to drain.
pub struct Receiver<const N: usize> {
    buffers: TripleBuffer<N>,
    /// Receive is not ready until the first idle following reset: the UART
    /// may be mid-frame when the receiver is constructed.
    ready: bool,
    error: AtomicBool,
    queued: AtomicU8,
}

impl<const N: usize> Receiver<N> {
    pub fn new() -> Self {
        Self {
            buffers: TripleBuffer::new(),
            ready: false,
            error: AtomicBool::new(false),
            queued: AtomicU8::new(0),
        }
    }

    /// Called from UART ISR context for every received byte.
    pub fn on_byte(&mut self, byte: u8) {
        if self.error.load(Ordering::Acquire) {
            return;
        }
        if self.queued.load(Ordering::Acquire) >= 2 {
            self.error.store(true, Ordering::Release);
            return;
        }
        let buf = self.buffers.write_mut();
        if buf.len() >= N {
            self.error.store(true, Ordering::Release);
            return;
        }
        let _ = buf.push(byte);
    }

    /// Called from UART ISR context on idle-line detection (frame boundary).
    pub fn on_idle(&mut self) {
        if !self.ready {
            self.ready = true;
            self.buffers.write_mut().clear();
            return;
        }

        if self.error.load(Ordering::Acquire) {
            self.buffers.write_mut().clear();
            return;
        }

        if !self.buffers.write_mut().is_empty() {
            if self.queued.load(Ordering::Acquire) == 0 {
                self.buffers.swap_write();
            }
            self.queued.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Called from UART ISR context when the peripheral reports a transport error.
    pub fn on_error(&mut self, _code: u8) {
        self.error.store(true, Ordering::Release);
    }

    /// True once a transport or buffer-overrun error is sticky and unacknowledged.
    pub fn has_error(&self) -> bool {
        self.error.load(Ordering::Acquire)
    }

    /// Acknowledges the sticky error, allowing further frames to be accepted.
    pub fn clear_error(&mut self) {
        self.error.store(false, Ordering::Release);
    }

    /// Called from main context. Returns the next queued frame, if any.
    ///
    /// The returned slice borrows the receiver's internal read slot and is
    /// only valid until the next call to `poll_next_frame`.
    pub fn poll_next_frame(&mut self) -> Option<&[u8]> {
        if self.queued.load(Ordering::Acquire) == 0 {
            return None;
        }

        self.buffers.read_mut().clear();
        self.buffers.swap_read();
        self.queued.fetch_sub(1, Ordering::AcqRel);
        if self.queued.load(Ordering::Acquire) > 0 {
            self.buffers.swap_write();
        }

        Some(self.buffers.read().as_slice())
    }
}

impl<const N: usize> Default for Receiver<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_bytes_before_first_idle() {
        let mut rx: Receiver<16> = Receiver::new();
        rx.on_byte(1);
        rx.on_byte(2);
        rx.on_idle();
        assert!(rx.poll_next_frame().is_none());
    }

    #[test]
    fn delivers_one_frame_after_ready_and_idle() {
        let mut rx: Receiver<16> = Receiver::new();
        rx.on_idle(); // becomes ready, drops partial bytes
        rx.on_byte(10);
        rx.on_byte(20);
        rx.on_byte(30);
        rx.on_idle();

        let frame = rx.poll_next_frame().expect("frame queued");
        assert_eq!(frame, &[10, 20, 30]);
        assert!(rx.poll_next_frame().is_none());
    }

    #[test]
    fn two_frames_queue_and_drain_in_order() {
        let mut rx: Receiver<16> = Receiver::new();
        rx.on_idle();

        rx.on_byte(1);
        rx.on_idle();
        rx.on_byte(2);
        rx.on_idle();

        assert_eq!(rx.poll_next_frame().unwrap(), &[1]);
        assert_eq!(rx.poll_next_frame().unwrap(), &[2]);
        assert!(rx.poll_next_frame().is_none());
    }

    #[test]
    fn third_frame_before_drain_flags_error() {
        let mut rx: Receiver<16> = Receiver::new();
        rx.on_idle();
        rx.on_byte(1);
        rx.on_idle();
        rx.on_byte(2);
        rx.on_idle();
        rx.on_byte(3);
        assert!(rx.has_error());
    }

    #[test]
    fn clear_error_allows_receiving_again() {
        let mut rx: Receiver<4> = Receiver::new();
        rx.on_idle();
        rx.on_error(1);
        assert!(rx.has_error());
        rx.clear_error();
        assert!(!rx.has_error());

        rx.on_byte(9);
        rx.on_idle();
        assert_eq!(rx.poll_next_frame().unwrap(), &[9]);
    }

    #[test]
    fn buffer_overrun_flags_error_instead_of_panicking() {
        let mut rx: Receiver<2> = Receiver::new();
        rx.on_idle();
        rx.on_byte(1);
        rx.on_byte(2);
        rx.on_byte(3); // buffer capacity is 2
        assert!(rx.has_error());
    }
}

//! External collaborator contracts (spec §6).
//!
//! The core consumes a UART peripheral only through [`UartPort`]; bit
//! timing, framing-error detection, and idle-line detection itself are the
//! collaborator's concern. Byte receipt, idle detection, tx-complete and
//! error notification reach the core as direct calls into
//! [`crate::receiver::Receiver`] / [`crate::sender::Sender`] from whatever
//! ISR glue the platform provides — that glue is out of scope here.

/// UART peripheral contract the sender drives to transmit frames.
pub trait UartPort {
    /// Hands `bytes` to the peripheral for transmission. Returns `false` if
    /// the peripheral cannot accept them right now (already busy).
    fn send(&mut self, bytes: &[u8]) -> bool;

    /// True while a previously accepted `send` is still in flight.
    fn is_tx_busy(&self) -> bool;

    /// Reads the most recently received byte. Only meaningful after a
    /// byte-received event, communicated to `Receiver::on_byte` by the
    /// platform's ISR glue.
    fn read_byte(&mut self) -> u8;

    /// Requests the peripheral to hold the line idle for the configured
    /// inter-frame gap (default 300us, spec §6) before any further send.
    fn generate_idle_line(&mut self);

    /// Masks the transmit-complete interrupt for a bounded critical section.
    fn suspend_send(&mut self);
    /// Unmasks the transmit-complete interrupt.
    fn resume_send(&mut self);
    /// Masks the byte-received interrupt for a bounded critical section.
    fn suspend_receive(&mut self);
    /// Unmasks the byte-received interrupt.
    fn resume_receive(&mut self);
}

/// Free-running microsecond clock used to drive `Module::update(dt_us)`.
pub trait MicrosecondClock {
    /// Elapsed microseconds since the last `reset`.
    fn read_us(&self) -> u32;
    /// Restarts the count from zero.
    fn reset(&mut self);
}

/// One-shot scheduler used by the sender to request the inter-frame idle gap.
pub trait IdleGapTimer {
    /// Schedules a single callback `offset_us` microseconds from now.
    fn schedule_after(&mut self, offset_us: u32);
}

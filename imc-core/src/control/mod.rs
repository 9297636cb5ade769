//! Control state machines: session establishment and liveness (spec §4.3).
//!
//! `Master` and `Slave` share no mutable state and never need to know
//! about each other; both implement [`ControlFsm`] so [`crate::module::Module`]
//! is generic over which role it hosts. A handled dispatch or a periodic
//! tick may ask the module to emit a reply — returned as a [`ControlAction`]
//! rather than through a callback, which keeps the module's own borrow of
//! its FSM simple (no reentrant call back into the FSM while it's still
//! mid-dispatch).

pub mod master;
pub mod slave;

pub use master::Master;
pub use slave::Slave;

/// Largest control-message payload (`Acknowledge`/`ReceiveError`, 4 bytes).
pub const MAX_CONTROL_PAYLOAD: usize = 4;

/// A reply the module should send on the FSM's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlAction {
    /// Nothing to send this tick.
    None,
    /// Send a control message with the given id and payload.
    Send {
        id: u8,
        payload: [u8; MAX_CONTROL_PAYLOAD],
        len: u8,
    },
}

impl ControlAction {
    pub(crate) fn send(id: u8, bytes: &[u8]) -> Self {
        let mut payload = [0u8; MAX_CONTROL_PAYLOAD];
        payload[..bytes.len()].copy_from_slice(bytes);
        ControlAction::Send {
            id,
            payload,
            len: bytes.len() as u8,
        }
    }
}

/// Outcome of dispatching an inbound control-recipient frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// Unknown id or payload size mismatch: the caller should emit `ReceiveError`.
    Invalid,
    /// Recognized and processed; may carry a reply to send.
    Handled(ControlAction),
}

/// Common interface the module dispatcher drives both FSM variants through.
pub trait ControlFsm {
    /// Advances all of this FSM's timers by `dt_us` microseconds.
    fn update_timers(&mut self, dt_us: u32);

    /// True once a session with the peer is established.
    fn is_established(&self) -> bool;

    /// Called after any frame (control or user) was actually handed to the sender.
    fn on_message_sent(&mut self);

    /// Called after any frame was successfully validated and dispatched.
    fn on_message_received(&mut self);

    /// Periodic work run once per `Module::update` tick, after inbound
    /// frames have been drained. May request a message be sent.
    fn periodic(&mut self) -> ControlAction;

    /// Handles an inbound control-recipient frame.
    fn dispatch(&mut self, id: u8, sequence: u16, payload: &[u8]) -> DispatchOutcome;
}

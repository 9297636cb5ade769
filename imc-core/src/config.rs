//! Configuration surface (spec §6). Defaults mirror the original
//! `ImcSettings` (100ms handshake/keep-alive period, 300ms ack/communication
//! timeout).

/// Tunable timing parameters shared by both the `Master` and `Slave`
/// control state machines. `maxMessageSize` (spec §6) is a buffer-capacity
/// const generic on `Receiver`/`Sender`/`Module`, not a runtime field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImcSettings {
    /// Period of `Handshake` emission while the slave is in RESET.
    pub slave_handshake_interval_us: u32,
    /// Maximum idle time before the established slave emits `KeepAlive`.
    pub slave_keep_alive_interval_us: u32,
    /// How long the slave waits for `Acknowledge` before reverting to RESET.
    pub slave_ack_timeout_us: u32,
    /// How long the master waits for any valid frame before reverting to RESET.
    pub master_communication_timeout_us: u32,
}

impl Default for ImcSettings {
    fn default() -> Self {
        Self {
            slave_handshake_interval_us: 100 * 1000,
            slave_keep_alive_interval_us: 100 * 1000,
            slave_ack_timeout_us: 300 * 1000,
            master_communication_timeout_us: 300 * 1000,
        }
    }
}

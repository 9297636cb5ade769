//! Slave role (spec §4.3.1): sends handshakes until acknowledged, then
//! keeps the session alive with periodic keep-alives.

use super::{ControlAction, ControlFsm, DispatchOutcome};
use crate::config::ImcSettings;
use crate::message::{decode_ack, ACKNOWLEDGE_ID, HANDSHAKE_ID, KEEP_ALIVE_ID, RECEIVE_ERROR_ID};

pub struct Slave {
    settings: ImcSettings,
    notification_timer: u32,
    keep_alive_ack_timeout: u32,
    established: bool,
}

impl Slave {
    pub fn new(settings: ImcSettings) -> Self {
        Self {
            // First tick sends a handshake immediately.
            notification_timer: settings.slave_handshake_interval_us,
            keep_alive_ack_timeout: 0,
            established: false,
            settings,
        }
    }
}

impl ControlFsm for Slave {
    fn update_timers(&mut self, dt_us: u32) {
        self.notification_timer = self.notification_timer.wrapping_add(dt_us);
        self.keep_alive_ack_timeout = self.keep_alive_ack_timeout.wrapping_add(dt_us);
    }

    fn is_established(&self) -> bool {
        self.established
    }

    fn on_message_sent(&mut self) {
        // Resets on *any* outbound frame, including control frames, so
        // KeepAlive emission coalesces with user traffic (spec §9 note c).
        self.notification_timer = 0;
    }

    fn on_message_received(&mut self) {}

    fn periodic(&mut self) -> ControlAction {
        if self.established && self.keep_alive_ack_timeout >= self.settings.slave_ack_timeout_us {
            crate::log::log_info!("imc slave: ack timeout, reverting to RESET");
            self.established = false;
        }

        if self.established {
            if self.notification_timer >= self.settings.slave_keep_alive_interval_us {
                return ControlAction::send(KEEP_ALIVE_ID, &[]);
            }
        } else if self.notification_timer >= self.settings.slave_handshake_interval_us {
            return ControlAction::send(HANDSHAKE_ID, &[]);
        }
        ControlAction::None
    }

    fn dispatch(&mut self, id: u8, _sequence: u16, payload: &[u8]) -> DispatchOutcome {
        match id {
            ACKNOWLEDGE_ID => {
                let ack = match decode_ack(payload) {
                    Some(ack) => ack,
                    None => return DispatchOutcome::Invalid,
                };
                if !self.established {
                    if ack.ack_id == HANDSHAKE_ID {
                        self.established = true;
                        self.keep_alive_ack_timeout = 0;
                        crate::log::log_info!("imc slave: handshake acknowledged, session established");
                    }
                } else if ack.ack_id == KEEP_ALIVE_ID {
                    self.keep_alive_ack_timeout = 0;
                }
                DispatchOutcome::Handled(ControlAction::None)
            }
            RECEIVE_ERROR_ID => DispatchOutcome::Handled(ControlAction::None),
            _ => DispatchOutcome::Invalid,
        }
    }
}

//! Master role (spec §4.3.2): accepts handshakes, acknowledges keep-alives,
//! reverts to RESET if nothing valid arrives for too long.

use super::{ControlAction, ControlFsm, DispatchOutcome};
use crate::config::ImcSettings;
use crate::message::{encode_ack, ACKNOWLEDGE_ID, HANDSHAKE_ID, KEEP_ALIVE_ID, RECEIVE_ERROR_ID};

pub struct Master {
    settings: ImcSettings,
    communication_timeout_timer: u32,
    established: bool,
}

impl Master {
    pub fn new(settings: ImcSettings) -> Self {
        Self {
            settings,
            communication_timeout_timer: 0,
            established: false,
        }
    }
}

impl ControlFsm for Master {
    fn update_timers(&mut self, dt_us: u32) {
        self.communication_timeout_timer = self.communication_timeout_timer.wrapping_add(dt_us);
    }

    fn is_established(&self) -> bool {
        self.established
    }

    fn on_message_sent(&mut self) {}

    fn on_message_received(&mut self) {
        self.communication_timeout_timer = 0;
    }

    fn periodic(&mut self) -> ControlAction {
        if self.communication_timeout_timer >= self.settings.master_communication_timeout_us {
            if self.established {
                crate::log::log_info!("imc master: communication timeout, reverting to RESET");
            }
            self.established = false;
        }
        ControlAction::None
    }

    fn dispatch(&mut self, id: u8, sequence: u16, payload: &[u8]) -> DispatchOutcome {
        match id {
            HANDSHAKE_ID => {
                if !payload.is_empty() {
                    return DispatchOutcome::Invalid;
                }
                self.established = true;
                crate::log::log_info!("imc master: handshake received, session established");
                DispatchOutcome::Handled(ControlAction::send(
                    ACKNOWLEDGE_ID,
                    &encode_ack(HANDSHAKE_ID, sequence),
                ))
            }
            KEEP_ALIVE_ID => {
                if !payload.is_empty() {
                    return DispatchOutcome::Invalid;
                }
                if self.established {
                    DispatchOutcome::Handled(ControlAction::send(
                        ACKNOWLEDGE_ID,
                        &encode_ack(KEEP_ALIVE_ID, sequence),
                    ))
                } else {
                    DispatchOutcome::Handled(ControlAction::None)
                }
            }
            RECEIVE_ERROR_ID => DispatchOutcome::Handled(ControlAction::None),
            _ => DispatchOutcome::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ImcSettings {
        ImcSettings {
            slave_handshake_interval_us: 1000,
            slave_keep_alive_interval_us: 1000,
            slave_ack_timeout_us: 3000,
            master_communication_timeout_us: 3000,
        }
    }

    #[test]
    fn handshake_establishes_session_and_replies_with_matching_ack() {
        let mut master = Master::new(settings());
        let outcome = master.dispatch(HANDSHAKE_ID, 7, &[]);
        assert!(master.is_established());
        match outcome {
            DispatchOutcome::Handled(ControlAction::Send { id, payload, len }) => {
                assert_eq!(id, ACKNOWLEDGE_ID);
                assert_eq!(len, 4);
                assert_eq!(payload[0], HANDSHAKE_ID);
                assert_eq!(u16::from_le_bytes([payload[2], payload[3]]), 7);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn keep_alive_before_established_is_handled_but_silent() {
        let mut master = Master::new(settings());
        let outcome = master.dispatch(KEEP_ALIVE_ID, 3, &[]);
        assert_eq!(outcome, DispatchOutcome::Handled(ControlAction::None));
    }

    #[test]
    fn keep_alive_once_established_is_acknowledged() {
        let mut master = Master::new(settings());
        master.dispatch(HANDSHAKE_ID, 0, &[]);
        let outcome = master.dispatch(KEEP_ALIVE_ID, 5, &[]);
        match outcome {
            DispatchOutcome::Handled(ControlAction::Send { id, .. }) => {
                assert_eq!(id, ACKNOWLEDGE_ID)
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn timeout_reverts_established_session_to_reset() {
        let mut master = Master::new(settings());
        master.dispatch(HANDSHAKE_ID, 0, &[]);
        assert!(master.is_established());

        master.update_timers(2000);
        master.periodic();
        assert!(master.is_established());

        master.update_timers(2000);
        master.periodic();
        assert!(!master.is_established());
    }

    #[test]
    fn any_valid_inbound_frame_resets_the_timeout_timer() {
        let mut master = Master::new(settings());
        master.dispatch(HANDSHAKE_ID, 0, &[]);

        master.update_timers(2000);
        master.on_message_received();
        master.update_timers(2000);
        master.periodic();
        assert!(master.is_established());
    }

    #[test]
    fn malformed_handshake_payload_is_invalid() {
        let mut master = Master::new(settings());
        assert_eq!(
            master.dispatch(HANDSHAKE_ID, 0, &[1]),
            DispatchOutcome::Invalid
        );
        assert!(!master.is_established());
    }
}

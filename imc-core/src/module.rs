//! The dispatcher (spec §4.4): validation, CRC, sequencing, control-vs-user
//! routing, `ReceiveError` generation, and send-queue reservation.

use heapless::Vec;

use crate::control::{ControlAction, ControlFsm, DispatchOutcome};
use crate::crc::CrcEngine;
use crate::frame::{self, CONTROL_RECIPIENT};
use crate::hal::UartPort;
use crate::message::{encode_receive_error, RECEIVE_ERROR_ID};
use crate::recipient::{InvalidRecipientNumber, Recipient, RecipientTable};
use crate::sender::Sender;

pub use crate::recipient::InvalidRecipientNumber as RecipientError;

/// Glues a [`ControlFsm`] (Master or Slave) to a [`Sender`]/receiver pair
/// over a fixed-capacity `N`-byte frame buffer (`N` is `maxMessageSize`
/// from spec §6, i.e. the largest frame either peer ever sends).
pub struct Module<'a, C, CrcE, U, const N: usize>
where
    C: ControlFsm,
    CrcE: CrcEngine,
    U: UartPort,
{
    control: C,
    crc: CrcE,
    sender: Sender<'a, U, N>,
    receiver: crate::receiver::Receiver<N>,
    recipients: RecipientTable<'a>,
    next_sequence_out: u16,
    last_ok_sequence_in: u16,
}

impl<'a, C, CrcE, U, const N: usize> Module<'a, C, CrcE, U, N>
where
    C: ControlFsm,
    CrcE: CrcEngine,
    U: UartPort,
{
    pub fn new(control: C, crc: CrcE, uart: &'a mut U) -> Self {
        Self {
            control,
            crc,
            sender: Sender::new(uart),
            receiver: crate::receiver::Receiver::new(),
            recipients: RecipientTable::new(),
            next_sequence_out: 0,
            last_ok_sequence_in: 0,
        }
    }

    /// Gives main-context byte/idle/error events from the UART to the
    /// receiver. ISR glue calls these; see [`crate::receiver::Receiver`].
    pub fn receiver_mut(&mut self) -> &mut crate::receiver::Receiver<N> {
        &mut self.receiver
    }

    /// Drives UART tx-complete / idle-gap-elapsed events into the sender;
    /// see [`Sender`].
    pub fn sender_mut(&mut self) -> &mut Sender<'a, U, N> {
        &mut self.sender
    }

    /// Registers the callback for user messages addressed to `number` (1..=3).
    pub fn register_recipient(
        &mut self,
        number: u8,
        recipient: &'a mut dyn Recipient,
    ) -> Result<(), InvalidRecipientNumber> {
        self.recipients.register(number, recipient)
    }

    pub fn is_established(&self) -> bool {
        self.control.is_established()
    }

    /// True if a user message could be enqueued right now (one slot is
    /// always reserved for control traffic).
    pub fn can_enqueue_user(&self) -> bool {
        self.sender.capacity() > 1
    }

    /// Sends a user message to `recipient` (1..=3) tagged with
    /// `message_number` (0..=0x3F). Requires an established session and a
    /// free slot beyond the one reserved for control messages.
    pub fn send_user(&mut self, recipient: u8, message_number: u8, payload: &[u8]) -> bool {
        if !(1..=3).contains(&recipient) {
            return false;
        }
        if !self.is_established() || self.sender.capacity() <= 1 {
            return false;
        }
        let id = frame::make_message_id(recipient, message_number);
        self.send_frame(id, payload)
    }

    /// Runs once per main-loop cycle: advances control timers, drains all
    /// queued inbound frames, reports a transport error if flagged, then
    /// runs the control FSM's periodic work. Never blocks.
    pub fn update(&mut self, dt_us: u32) {
        self.control.update_timers(dt_us);

        loop {
            let frame = match self.receiver.poll_next_frame() {
                Some(bytes) => {
                    let mut owned: Vec<u8, N> = Vec::new();
                    let _ = owned.extend_from_slice(bytes);
                    owned
                }
                None => break,
            };
            self.handle_received(&frame);
        }

        if self.receiver.has_error() {
            crate::log::log_warn!("imc: receiver flagged a transport error");
            self.emit_receive_error();
            self.receiver.clear_error();
        }

        if let ControlAction::Send { id, payload, len } = self.control.periodic() {
            self.send_control(id, &payload[..len as usize]);
        }
    }

    fn handle_received(&mut self, bytes: &[u8]) {
        if !self.validate(bytes) {
            crate::log::log_warn!("imc: dropping frame that failed length/CRC validation");
            self.emit_receive_error();
            return;
        }

        let id = bytes[0];
        let size = bytes[1];
        let sequence = u16::from_le_bytes([bytes[2], bytes[3]]);
        let payload = &bytes[frame::HEADER_LEN..frame::HEADER_LEN + size as usize];
        let recipient = frame::recipient_number(id);

        let dispatched = if recipient == CONTROL_RECIPIENT {
            match self.control.dispatch(id, sequence, payload) {
                DispatchOutcome::Invalid => false,
                DispatchOutcome::Handled(action) => {
                    if let ControlAction::Send {
                        id: reply_id,
                        payload: reply_payload,
                        len,
                    } = action
                    {
                        let _ = self.send_control(reply_id, &reply_payload[..len as usize]);
                    }
                    true
                }
            }
        } else {
            self.recipients.dispatch(recipient, id, payload)
        };

        if dispatched {
            self.last_ok_sequence_in = sequence;
            self.control.on_message_received();
        } else {
            crate::log::log_warn!("imc: frame id={:?} rejected by dispatch", id);
            self.emit_receive_error();
        }
    }

    fn validate(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() < frame::HEADER_LEN + frame::CRC_LEN {
            return false;
        }
        let size = bytes[1];
        let expected_padded = frame::padded_payload_len(size) as usize;
        let actual_padded = bytes.len() - frame::HEADER_LEN - frame::CRC_LEN;
        if expected_padded != actual_padded {
            return false;
        }

        let crc_offset = bytes.len() - frame::CRC_LEN;
        let received_crc =
            u32::from_le_bytes(bytes[crc_offset..crc_offset + 4].try_into().unwrap());

        self.crc.reset();
        for &b in &bytes[0..frame::HEADER_LEN + size as usize] {
            self.crc.add(b);
        }
        received_crc == self.crc.get()
    }

    fn emit_receive_error(&mut self) {
        let payload = encode_receive_error(self.last_ok_sequence_in);
        let _ = self.send_control(RECEIVE_ERROR_ID, &payload);
    }

    fn send_control(&mut self, id: u8, payload: &[u8]) -> bool {
        if self.sender.capacity() == 0 {
            return false;
        }
        self.send_frame(id, payload)
    }

    fn send_frame(&mut self, id: u8, payload: &[u8]) -> bool {
        let size = payload.len() as u8;
        let padded = frame::padded_payload_len(size);

        let mut buf: Vec<u8, N> = Vec::new();
        let _ = buf.push(id);
        let _ = buf.push(size);
        let sequence = self.next_sequence_out;
        let _ = buf.extend_from_slice(&sequence.to_le_bytes());
        let _ = buf.extend_from_slice(payload);
        for _ in size..padded {
            let _ = buf.push(0);
        }

        self.crc.reset();
        for &b in &buf[0..frame::HEADER_LEN + size as usize] {
            self.crc.add(b);
        }
        let crc = self.crc.get();
        let _ = buf.extend_from_slice(&crc.to_le_bytes());

        if self.sender.try_send(&buf) {
            self.next_sequence_out = self.next_sequence_out.wrapping_add(1);
            // Every frame the sender actually accepted resets the control
            // FSM's liveness timers, not just ones sent from `periodic()`
            // (spec §4.3.1 / §9 note c) — user sends and `ReceiveError`
            // replies coalesce with `KeepAlive` emission the same way.
            self.control.on_message_sent();
            true
        } else {
            false
        }
    }
}

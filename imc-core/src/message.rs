//! Control message identifiers and payload encodings (recipient 0).
//!
//! Control payloads are a handful of fixed-width integer fields packed the
//! same way the two peers' native struct layout would pack them (both
//! peers are assumed to share byte order, per the protocol's non-goals),
//! so they are hand-encoded here rather than run through a
//! self-describing serializer: a varint-based format would make the
//! on-wire length of e.g. `Acknowledge` depend on the *value* of
//! `ackSequence`, which would break the fixed `size` field every control
//! message declares.

use crate::frame::{make_message_id, CONTROL_RECIPIENT};

/// Slave -> Master, opens a session. Empty payload.
pub const HANDSHAKE_ID: u8 = make_message_id(CONTROL_RECIPIENT, 0x01);

/// Master -> Slave, in reply to `Handshake` or `KeepAlive`.
pub const ACKNOWLEDGE_ID: u8 = make_message_id(CONTROL_RECIPIENT, 0x02);

/// Either direction, sent when a received frame failed validation or dispatch.
pub const RECEIVE_ERROR_ID: u8 = make_message_id(CONTROL_RECIPIENT, 0x03);

/// Slave -> Master, emitted to keep an established session alive.
pub const KEEP_ALIVE_ID: u8 = make_message_id(CONTROL_RECIPIENT, 0x04);

/// Declared payload size, in bytes, for every control message kind.
pub const EMPTY_PAYLOAD_LEN: u8 = 0;
pub const ACK_PAYLOAD_LEN: u8 = 4;
pub const RECEIVE_ERROR_PAYLOAD_LEN: u8 = 4;

/// Decoded `Acknowledge` payload: `{ ackId: u8, _pad: u8, ackSequence: u16 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckMessageContents {
    pub ack_id: u8,
    pub ack_sequence: u16,
}

/// Encodes an `Acknowledge` payload into its 4-byte wire form.
pub fn encode_ack(ack_id: u8, ack_sequence: u16) -> [u8; 4] {
    let seq = ack_sequence.to_le_bytes();
    [ack_id, 0, seq[0], seq[1]]
}

/// Decodes an `Acknowledge` payload. Returns `None` if `payload` isn't exactly 4 bytes.
pub fn decode_ack(payload: &[u8]) -> Option<AckMessageContents> {
    if payload.len() != ACK_PAYLOAD_LEN as usize {
        return None;
    }
    Some(AckMessageContents {
        ack_id: payload[0],
        ack_sequence: u16::from_le_bytes([payload[2], payload[3]]),
    })
}

/// Decoded `ReceiveError` payload: `{ lastOkSequence: u16, _pad: u16 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiveErrorContents {
    pub last_ok_sequence: u16,
}

/// Encodes a `ReceiveError` payload into its 4-byte wire form.
pub fn encode_receive_error(last_ok_sequence: u16) -> [u8; 4] {
    let seq = last_ok_sequence.to_le_bytes();
    [seq[0], seq[1], 0, 0]
}

/// Decodes a `ReceiveError` payload. Returns `None` if `payload` isn't exactly 4 bytes.
pub fn decode_receive_error(payload: &[u8]) -> Option<ReceiveErrorContents> {
    if payload.len() != RECEIVE_ERROR_PAYLOAD_LEN as usize {
        return None;
    }
    Some(ReceiveErrorContents {
        last_ok_sequence: u16::from_le_bytes([payload[0], payload[1]]),
    })
}

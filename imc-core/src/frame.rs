//! Wire frame layout: header, padded payload, trailing CRC.
//!
//! ```text
//! offset  size  field
//! 0       1     id        (high 2 bits: recipient, low 6: message number)
//! 1       1     size      (unpadded payload length, 0..=244)
//! 2       2     sequence  (little-endian)
//! 4       P     data      (payload padded to a multiple of 4, P = max(4, ceil(size/4)*4))
//! 4+P     4     crc       (over bytes [0, 4+size), little-endian)
//! ```

/// Length of the `id` + `size` + `sequence` header, in bytes.
pub const HEADER_LEN: usize = 4;

/// Length of the trailing CRC field, in bytes.
pub const CRC_LEN: usize = 4;

/// Largest payload a single frame may carry (so header + payload + crc fits in a u8 length).
pub const MAX_PAYLOAD: u8 = 244;

/// High two bits of `id` select the recipient; low six bits select the message number.
pub const RECIPIENT_MASK: u8 = 0xC0;

/// Recipient number reserved for control messages.
pub const CONTROL_RECIPIENT: u8 = 0;

/// Rounds `size` up to the CRC-alignment boundary the wire format requires:
/// 4 bytes minimum, otherwise the next multiple of 4.
pub const fn padded_payload_len(size: u8) -> u8 {
    if size <= 4 {
        4
    } else {
        size + 3 - ((size + 3) % 4)
    }
}

/// Total on-wire length of a frame carrying `size` bytes of payload.
pub const fn frame_len(size: u8) -> usize {
    HEADER_LEN + padded_payload_len(size) as usize + CRC_LEN
}

/// Builds a message `id` from a recipient number (0..=3) and a message number (0..=0x3F).
pub const fn make_message_id(recipient: u8, message_number: u8) -> u8 {
    (recipient << 6) | (message_number & 0x3F)
}

/// Extracts the recipient number (0..=3) from a message `id`.
pub const fn recipient_number(id: u8) -> u8 {
    (id & RECIPIENT_MASK) >> 6
}

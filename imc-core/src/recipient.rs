//! User message recipients (recipients 1..=3).
//!
//! The source's C-ABI callback-plus-opaque-context registration becomes a
//! plain trait object here: no allocation is needed to store `&mut dyn
//! Recipient` in a fixed three-slot table, and it reads as ordinary Rust
//! rather than a reimplementation of a function-pointer vtable.

/// Handles user messages for one recipient number.
pub trait Recipient {
    /// Called with the full message `id` (recipient bits included) and its
    /// unpadded payload. Returns `true` if the message was recognized and
    /// valid; returning `false` causes the dispatcher to emit a `ReceiveError`.
    fn on_message(&mut self, id: u8, payload: &[u8]) -> bool;
}

/// Fixed table of the three user recipient slots.
pub struct RecipientTable<'a> {
    slots: [Option<&'a mut dyn Recipient>; 3],
}

/// A recipient number outside the valid `1..=3` range was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidRecipientNumber(pub u8);

impl<'a> RecipientTable<'a> {
    pub fn new() -> Self {
        Self {
            slots: [None, None, None],
        }
    }

    pub fn register(
        &mut self,
        number: u8,
        recipient: &'a mut dyn Recipient,
    ) -> Result<(), InvalidRecipientNumber> {
        match number {
            1..=3 => {
                self.slots[(number - 1) as usize] = Some(recipient);
                Ok(())
            }
            other => Err(InvalidRecipientNumber(other)),
        }
    }

    /// Dispatches to the recipient registered for `number` (1..=3).
    /// Returns `false` if `number` is out of range or unregistered.
    pub fn dispatch(&mut self, number: u8, id: u8, payload: &[u8]) -> bool {
        match number {
            1..=3 => match self.slots[(number - 1) as usize].as_mut() {
                Some(recipient) => recipient.on_message(id, payload),
                None => false,
            },
            _ => false,
        }
    }
}

impl<'a> Default for RecipientTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

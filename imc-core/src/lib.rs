//! Link-layer protocol core for inter-MCU communication over a UART.
//!
//! `imc-core` frames, validates and sequences messages between two
//! microcontrollers, runs the handshake/keep-alive state machines that
//! establish and supervise a session, and paces transmission so a bare
//! idle-line UART can delimit frames on the wire. It owns no UART, timer
//! or CRC peripheral itself — [`hal`] defines the traits a board-support
//! crate implements, and [`Module`] is generic over all three plus the
//! [`control::ControlFsm`] role (`Master` or `Slave`).
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod crc;
pub mod frame;
pub mod hal;
mod log;
pub mod message;
pub mod module;
pub mod receiver;
pub mod recipient;
pub mod sender;
pub mod triple_buffer;

pub use config::ImcSettings;
pub use control::{ControlFsm, Master, Slave};
pub use crc::{Crc32, CrcEngine};
pub use hal::{IdleGapTimer, MicrosecondClock, UartPort};
pub use module::{Module, RecipientError};
pub use receiver::Receiver;
pub use recipient::{Recipient, RecipientTable};
pub use sender::Sender;

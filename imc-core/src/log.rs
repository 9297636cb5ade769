//! Thin wrappers around `defmt`'s logging macros.
//!
//! `defmt` is an optional, off-by-default dependency (see `Cargo.toml`):
//! its macros pull in calls that only link against a `#[defmt::global_logger]`,
//! which no host target provides. Firmware crates enable the `defmt`
//! feature and supply a logger (`defmt-rtt` or similar) the way the
//! teacher's firmware binaries do; host builds — including `cargo test`,
//! which must link — get silent no-ops instead.

macro_rules! log_info {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
    };
}

pub(crate) use log_info;
pub(crate) use log_warn;

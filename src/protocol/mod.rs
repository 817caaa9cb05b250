//! Command set of the panel controller.
//!
//! Encoding is pure: a [`Command`] becomes an ordered list of byte groups,
//! each tagged with the control line level, which a transport then replays.

mod command;
mod params;

pub use command::{Command, SendMode};
pub use params::{AddressMode, Palette};

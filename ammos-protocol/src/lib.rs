//! Host Communication Protocol
//!
//! This crate defines the line-oriented protocol between the pattern host
//! (web dashboard / playlist manager) and the sand table controller. The
//! protocol is designed for simplicity, strict pacing, and robustness
//! against truncated transmissions.
//!
//! # Protocol Overview
//!
//! Every request is one newline-terminated line; every line produces exactly
//! one acknowledgement token:
//! ```text
//! HOME                     -> HOMING ... HOMED
//! RESET_THETA              -> THETA_RESET
//! GET_VERSION              -> <version string>
//! SET_SPEED <1-100>        -> SPEED_SET
//! <theta>,<rho>;...;       -> R          (after the whole batch executed)
//! anything else            -> IGNORED: <original line>
//! ```
//!
//! The host paces transmission strictly on acknowledgements: a new waypoint
//! batch may only be sent after the previous batch's `R`. Pause/stop is
//! implemented purely by withholding further batches.

#![no_std]
#![deny(unsafe_code)]

pub mod ack;
pub mod command;

pub use ack::{Ack, MAX_RESPONSE_LEN};
pub use command::{parse_line, Command, ParseError, Waypoint, MAX_BATCH_WAYPOINTS, MAX_LINE_LEN};

/// Version string reported for `GET_VERSION`
pub const FIRMWARE_VERSION: &str = concat!("ammos ", env!("CARGO_PKG_VERSION"));

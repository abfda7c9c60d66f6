//! Board-agnostic core logic for the sand table controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction trait for the axis drivers
//! - Waypoint batch buffer
//! - Path interpolation and mechanical-coupling compensation
//! - Dual-axis synchronized motion engine
//! - Crash-homing state machine
//! - Autonomous rose-curve pattern generation
//! - The controller owning all mutable motion state
//!
//! All shared mutable state (position, revolution counter, homing state,
//! mode) is owned by a single [`controller::Controller`] instance. The
//! firmware hands it to exactly one task, preserving the strict ordering
//! guarantees of the line protocol.

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod controller;
pub mod homing;
pub mod motion;
pub mod pattern;
pub mod traits;

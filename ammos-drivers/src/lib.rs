//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in ammos-core for the table's hardware:
//!
//! - Step/dir stepper drivers (A4988, DRV8825, TMC2209 standalone)
//! - GPIO adapters for embedded-hal pins

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod stepper;

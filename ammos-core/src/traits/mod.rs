//! Hardware abstraction traits
//!
//! These traits define the interface between core logic and hardware
//! implementations, allowing the core to be tested without hardware.

mod axis;

pub use axis::{AxisDriver, Direction};

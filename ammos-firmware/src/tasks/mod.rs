//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod control;
pub mod inputs;
pub mod serial;
pub mod stepper;

pub use control::control_task;
pub use inputs::inputs_task;
pub use serial::{serial_rx_task, serial_tx_task};
pub use stepper::{stepper_task, GpioStepper};

//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use ammos_core::controller::PanelInputs;
use ammos_core::motion::StepDelta;
use ammos_protocol::{Ack, MAX_LINE_LEN};

/// Channel capacity for complete lines from the host
const LINE_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outbound acknowledgements
const ACK_CHANNEL_SIZE: usize = 8;

/// Channel capacity for per-tick step deltas
const STEP_CHANNEL_SIZE: usize = 8;

/// Complete newline-terminated lines received from the host
pub static LINE_CHANNEL: Channel<CriticalSectionRawMutex, String<MAX_LINE_LEN>, LINE_CHANNEL_SIZE> =
    Channel::new();

/// Acknowledgement tokens to send back to the host
pub static ACK_CHANNEL: Channel<CriticalSectionRawMutex, Ack, ACK_CHANNEL_SIZE> = Channel::new();

/// Step deltas from the control loop to the pulse generator
pub static STEP_CHANNEL: Channel<CriticalSectionRawMutex, StepDelta, STEP_CHANNEL_SIZE> =
    Channel::new();

/// Latest panel sample (mode switch + pots), overwritten by the inputs task
pub static PANEL_INPUTS: Signal<CriticalSectionRawMutex, PanelInputs> = Signal::new();

/// Driver energize state, signaled by the control task on change
pub static MOTORS_ACTIVE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

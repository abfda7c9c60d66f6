//! Control loop task
//!
//! Owns the core controller and advances it at the configured tick
//! rate. Each tick drains pending host lines, folds in the latest panel
//! sample, and forwards the resulting step deltas and acknowledgements.

use defmt::*;
use embassy_time::{Duration, Ticker};

use ammos_core::config::TableConfig;
use ammos_core::controller::{Controller, PanelInputs};

use crate::channels::{ACK_CHANNEL, LINE_CHANNEL, MOTORS_ACTIVE, PANEL_INPUTS, STEP_CHANNEL};

/// Control task - runs the motion controller tick loop
#[embassy_executor::task]
pub async fn control_task(config: TableConfig) {
    info!("Control task started, tick rate {} Hz", config.tick_hz);

    let mut controller = Controller::new(config);
    let mut panel: Option<PanelInputs> = None;
    let mut motors_active = false;

    let period = Duration::from_micros(1_000_000 / config.tick_hz as u64);
    let mut ticker = Ticker::every(period);

    loop {
        ticker.next().await;

        // Host lines first so a HOME arriving this tick preempts promptly
        while let Ok(line) = LINE_CHANNEL.try_receive() {
            if let Some(ack) = controller.handle_line(line.as_str()) {
                if ACK_CHANNEL.try_send(ack).is_err() {
                    warn!("Ack channel full, dropping ack");
                }
            }
        }

        // Latest panel sample, if the inputs task produced a new one
        if let Some(sample) = PANEL_INPUTS.try_take() {
            panel = Some(sample);
        }

        let output = controller.tick(panel);

        if let Some(delta) = output.steps {
            if STEP_CHANNEL.try_send(delta).is_err() {
                // The pulse generator fell behind; dropping the delta
                // would corrupt position tracking, so this must stay rare
                warn!("Step channel full, dropping delta");
            }
        }

        if let Some(ack) = output.ack {
            if ACK_CHANNEL.try_send(ack).is_err() {
                warn!("Ack channel full, dropping ack");
            }
        }

        // Tell the pulse generator when to energize/release the drivers
        let active = controller.motors_active();
        if active != motors_active {
            motors_active = active;
            MOTORS_ACTIVE.signal(active);
        }
    }
}

//! Panel inputs task
//!
//! Samples the mode switch and the two potentiometers and publishes the
//! latest reading for the control loop. Pot readings are normalized to
//! [0, 1]; the control core does its own clamping and scaling.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};

use ammos_core::controller::PanelInputs;

use crate::channels::PANEL_INPUTS;

/// Sample interval. The control loop only needs the pots at pattern
/// waypoint granularity, well below this rate.
const SAMPLE_INTERVAL_MS: u64 = 50;

/// Full-scale value of the RP2040 12-bit ADC
const ADC_MAX: f32 = 4095.0;

/// Inputs task - samples the autonomous-mode panel
#[embassy_executor::task]
pub async fn inputs_task(
    mut adc: Adc<'static, Async>,
    mut frequency_pot: Channel<'static>,
    mut min_rho_pot: Channel<'static>,
    mode_switch: Input<'static>,
) {
    info!("Inputs task started");

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        ticker.next().await;

        let frequency = match adc.read(&mut frequency_pot).await {
            Ok(raw) => raw as f32 / ADC_MAX,
            Err(e) => {
                warn!("Frequency pot read error: {:?}", e);
                continue;
            }
        };
        let min_rho = match adc.read(&mut min_rho_pot).await {
            Ok(raw) => raw as f32 / ADC_MAX,
            Err(e) => {
                warn!("Radius pot read error: {:?}", e);
                continue;
            }
        };

        // Switch wired to ground with internal pull-up: closed = autonomous
        let sample = PanelInputs {
            mode_switch: mode_switch.is_low(),
            frequency,
            min_rho,
        };

        PANEL_INPUTS.signal(sample);
    }
}

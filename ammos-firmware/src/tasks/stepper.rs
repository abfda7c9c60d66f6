//! Step pulse generator task
//!
//! Turns per-tick step deltas from the control loop into electrical
//! pulses on the two axis drivers. The control task signals when the
//! drivers must be energized, so the motors hold torque exactly while a
//! move or homing sweep is running and the table is silent in between.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::Timer;

use ammos_core::motion::StepDelta;
use ammos_core::traits::{AxisDriver, Direction};
use ammos_drivers::gpio::HalPin;
use ammos_drivers::stepper::StepDir;

use crate::channels::{MOTORS_ACTIVE, STEP_CHANNEL};

/// Concrete driver type for the board's GPIO-wired stepper modules
pub type GpioStepper =
    StepDir<HalPin<Output<'static>>, HalPin<Output<'static>>, HalPin<Output<'static>>>;

/// Spacing between interleaved pulses. 20 pulses per tick at this
/// spacing fits inside the 5 ms control period with margin.
const PULSE_SPACING_US: u64 = 200;

/// Stepper task - drives the theta and rho axes
#[embassy_executor::task]
pub async fn stepper_task(mut theta: GpioStepper, mut rho: GpioStepper) {
    info!("Stepper task started");

    theta.disable();
    rho.disable();

    loop {
        match select(STEP_CHANNEL.receive(), MOTORS_ACTIVE.wait()).await {
            Either::First(delta) => {
                if !theta.is_enabled() {
                    theta.enable();
                    rho.enable();
                }
                emit_delta(&mut theta, &mut rho, delta).await;
            }
            Either::Second(active) => {
                if active && !theta.is_enabled() {
                    debug!("Energizing motors");
                    theta.enable();
                    rho.enable();
                } else if !active && theta.is_enabled() {
                    debug!("Motion done, de-energizing motors");
                    theta.disable();
                    rho.disable();
                }
            }
        }
    }
}

/// Pulse both axes for one delta, interleaved so they finish together
async fn emit_delta(theta: &mut GpioStepper, rho: &mut GpioStepper, delta: StepDelta) {
    theta.set_direction(Direction::from_delta(delta.theta));
    rho.set_direction(Direction::from_delta(delta.rho));

    let mut theta_left = delta.theta.unsigned_abs();
    let mut rho_left = delta.rho.unsigned_abs();

    while theta_left > 0 || rho_left > 0 {
        if theta_left > 0 {
            theta.step();
            theta_left -= 1;
        }
        if rho_left > 0 {
            rho.step();
            rho_left -= 1;
        }
        Timer::after_micros(PULSE_SPACING_US).await;
    }
}

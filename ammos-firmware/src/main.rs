//! Ammos - Kinetic Sand Table Firmware
//!
//! Main firmware binary for RP2040-based polar sand tables. A magnet on
//! a rotating arm drags a steel ball through sand; this firmware runs
//! the two-axis motion controller, the host line protocol, and the
//! standalone pattern mode.
//!
//! Named after the Greek "ammos" meaning "sand".

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ammos_drivers::gpio::HalPin;
use ammos_drivers::stepper::StepDir;

mod channels;
mod tasks;

// Baked-in table configuration, generated by build.rs from table.toml
include!(concat!(env!("OUT_DIR"), "/table_config.rs"));

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ammos firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    info!(
        "Table config: {} steps/rev, {} steps rho travel, coupling 1:{}",
        TABLE_CONFIG.steps_per_theta_rev,
        TABLE_CONFIG.rho_travel_steps,
        TABLE_CONFIG.coupling_ratio
    );

    // Setup UART for host communication (115200 baud default)
    let uart_config = UartConfig::default();

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for host communication");

    // Axis stepper drivers on the board's X and Y driver sockets
    // (SKR Pico: X STEP=GPIO11 DIR=GPIO10 EN=GPIO12, Y STEP=GPIO6 DIR=GPIO5 EN=GPIO7)
    let theta = StepDir::new_active_low_enable(
        HalPin::new(Output::new(p.PIN_11, Level::Low)),
        HalPin::new(Output::new(p.PIN_10, Level::Low)),
        HalPin::new(Output::new(p.PIN_12, Level::High)),
    );
    let rho = StepDir::new_active_low_enable(
        HalPin::new(Output::new(p.PIN_6, Level::Low)),
        HalPin::new(Output::new(p.PIN_5, Level::Low)),
        HalPin::new(Output::new(p.PIN_7, Level::High)),
    );

    info!("Stepper drivers initialized");

    // Setup ADC for the two panel potentiometers
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let frequency_pot = Channel::new_pin(p.PIN_26, Pull::None);
    let min_rho_pot = Channel::new_pin(p.PIN_27, Pull::None);

    // Mode switch to ground, internal pull-up
    let mode_switch = Input::new(p.PIN_22, Pull::Up);

    info!("Panel inputs initialized");

    // Spawn tasks
    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner.spawn(tasks::stepper_task(theta, rho)).unwrap();
    spawner
        .spawn(tasks::inputs_task(adc, frequency_pot, min_rho_pot, mode_switch))
        .unwrap();
    spawner.spawn(tasks::control_task(TABLE_CONFIG)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

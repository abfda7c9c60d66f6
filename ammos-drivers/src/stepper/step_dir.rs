//! Step/dir stepper driver
//!
//! Drives any stepper module with the common STEP/DIR/ENABLE interface
//! (A4988, DRV8825, TMC2209 in standalone mode). One pulse on STEP
//! advances the motor by one microstep in the direction selected on DIR.
//!
//! The ENABLE input is active-low on all of the boards above, but the
//! polarity is configurable for carrier boards that buffer it.

use ammos_core::traits::{AxisDriver, Direction};

use crate::gpio::OutputPin;

/// Step/dir/enable stepper driver
pub struct StepDir<S, D, E> {
    step: S,
    dir: D,
    enable: E,
    /// If true, driver enabled = enable pin HIGH
    enable_inverted: bool,
    /// If true, clockwise = dir pin LOW
    dir_inverted: bool,
    enabled: bool,
}

impl<S: OutputPin, D: OutputPin, E: OutputPin> StepDir<S, D, E> {
    /// Create a new driver with the given pin polarities.
    ///
    /// # Arguments
    /// - `enable_inverted`: If true, the driver is energized when the
    ///   enable pin is HIGH (default boards are active-low)
    /// - `dir_inverted`: If true, clockwise pulses drive the dir pin LOW
    ///   (flips motor rotation without rewiring)
    pub fn new(step: S, dir: D, enable: E, enable_inverted: bool, dir_inverted: bool) -> Self {
        let mut driver = Self {
            step,
            dir,
            enable,
            enable_inverted,
            dir_inverted,
            enabled: false,
        };
        // Start de-energized with a defined direction
        driver.disable();
        driver.set_direction(Direction::Clockwise);
        driver
    }

    /// Create a driver with the standard active-low enable
    pub fn new_active_low_enable(step: S, dir: D, enable: E) -> Self {
        Self::new(step, dir, enable, false, false)
    }
}

impl<S: OutputPin, D: OutputPin, E: OutputPin> AxisDriver for StepDir<S, D, E> {
    fn set_direction(&mut self, dir: Direction) {
        let high = (dir == Direction::Clockwise) != self.dir_inverted;
        if high {
            self.dir.set_high();
        } else {
            self.dir.set_low();
        }
    }

    fn step(&mut self) {
        // Rising edge steps; the caller paces pulses well above the
        // minimum pulse width of these drivers (~2 us)
        self.step.set_high();
        self.step.set_low();
    }

    fn enable(&mut self) {
        self.enabled = true;
        if self.enable_inverted {
            self.enable.set_high();
        } else {
            self.enable.set_low();
        }
    }

    fn disable(&mut self) {
        self.enabled = false;
        if self.enable_inverted {
            self.enable.set_low();
        } else {
            self.enable.set_high();
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

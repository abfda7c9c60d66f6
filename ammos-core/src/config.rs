//! Hardware configuration for the two table axes.
//!
//! All mechanical constants live here: step counts, the coupling gear
//! ratio, the fixed interpolation step size, and the rates for normal
//! motion and the homing sweep. The firmware fills this struct from its
//! build-time validated `table.toml`; hosts and tests use the defaults.

use crate::motion::TWO_PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration errors detected by [`TableConfig::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// An axis step count is zero
    ZeroAxisSteps,
    /// Control tick rate is zero
    ZeroTickRate,
    /// Coupling gear ratio must be positive
    InvalidCoupling,
    /// Interpolation step size must be positive
    InvalidInterpolationStep,
    /// Homing rate below the tick rate would stall the sweep
    HomingRateTooLow,
    /// Homing budget factor must exceed 1.0
    InvalidHomingBudget,
}

/// Mechanical and rate constants for the table
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableConfig {
    /// Steps for one full revolution of the angular axis
    pub steps_per_theta_rev: u32,
    /// Steps for full radial travel (rho 0 to rho 1)
    pub rho_travel_steps: u32,
    /// Coupling gear ratio: one theta revolution drags the radial axis
    /// `steps_per_theta_rev / coupling_ratio` steps
    pub coupling_ratio: f32,
    /// Fixed sub-step size in (theta, rho) space for path interpolation
    pub interpolation_step: f32,
    /// Maximum step rate in steps/s (the value `SET_SPEED 100` selects)
    pub max_step_rate: u32,
    /// Control loop tick rate in Hz
    pub tick_hz: u32,
    /// Inward step rate during the homing crash sweep, steps/s
    pub homing_step_rate: u32,
    /// Fraction of full travel swept past the expected stop before the
    /// tracked position is declared crashed (no limit switch exists)
    pub homing_overshoot: f32,
    /// Tick budget for the sweep as a multiple of the expected duration
    pub homing_budget_factor: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            steps_per_theta_rev: 3200, // 200 full steps * 16 microsteps
            rho_travel_steps: 9600,
            coupling_ratio: 10.0,
            interpolation_step: 0.1,
            max_step_rate: 2000,
            tick_hz: 200,
            homing_step_rate: 800,
            homing_overshoot: 0.05,
            homing_budget_factor: 1.25,
        }
    }
}

impl TableConfig {
    /// Check all constants for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_theta_rev == 0 || self.rho_travel_steps == 0 {
            return Err(ConfigError::ZeroAxisSteps);
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.coupling_ratio <= 0.0 {
            return Err(ConfigError::InvalidCoupling);
        }
        if self.interpolation_step <= 0.0 {
            return Err(ConfigError::InvalidInterpolationStep);
        }
        if self.homing_step_rate < self.tick_hz {
            return Err(ConfigError::HomingRateTooLow);
        }
        if self.homing_budget_factor <= 1.0 {
            return Err(ConfigError::InvalidHomingBudget);
        }
        Ok(())
    }

    /// Convert an angular position (radians) to absolute steps
    pub fn theta_to_steps(&self, theta: f32) -> i32 {
        libm::roundf(theta * self.steps_per_theta_rev as f32 / TWO_PI) as i32
    }

    /// Convert a radial position to absolute steps, clamping rho to [0, 1]
    pub fn rho_to_steps(&self, rho: f32) -> i32 {
        let rho = rho.clamp(0.0, 1.0);
        libm::roundf(rho * self.rho_travel_steps as f32) as i32
    }

    /// Radial steps dragged per full theta revolution by the coupling
    pub fn coupling_steps_per_rev(&self) -> f32 {
        self.steps_per_theta_rev as f32 / self.coupling_ratio
    }

    /// Steps per control tick for a given speed percentage
    pub fn move_steps_per_tick(&self, speed_percent: u8) -> f32 {
        let rate = self.max_step_rate as f32 * speed_percent as f32 / 100.0;
        rate / self.tick_hz as f32
    }

    /// Inward steps per control tick during the homing sweep
    pub fn homing_steps_per_tick(&self) -> u32 {
        self.homing_step_rate / self.tick_hz
    }

    /// Tracked-position threshold (in swept steps) standing in for the
    /// physical end-stop
    pub fn homing_stop_steps(&self) -> u32 {
        let travel = self.rho_travel_steps as f32 * (1.0 + self.homing_overshoot);
        libm::ceilf(travel) as u32
    }

    /// Sweep tick budget; expiry aborts homing as failed
    pub fn homing_budget_ticks(&self) -> u32 {
        let per_tick = self.homing_steps_per_tick().max(1) as f32;
        let expected = self.homing_stop_steps() as f32 / per_tick;
        libm::ceilf(expected * self.homing_budget_factor) as u32
    }
}

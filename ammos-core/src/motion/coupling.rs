//! Mechanical-coupling compensation.
//!
//! The axes share a gear train: one full revolution of the angular axis
//! drags the radial carriage a fixed number of steps, independent of the
//! radial motor's own motion. Left uncorrected, the error grows without
//! bound over a running session. The compensator integrates fractional
//! revolutions once per commanded move and produces the radial step offset
//! to subtract from each naive target.

use super::position::TWO_PI;
use crate::config::TableConfig;

/// Tracks cumulative angular travel and converts it to the radial step
/// offset induced by the gear coupling.
#[derive(Debug, Clone)]
pub struct CouplingCompensator {
    /// Signed fractional revolutions since the last homing/theta reset
    revolutions: f32,
    /// Set once the first move after a reset has re-anchored accounting
    primed: bool,
}

impl Default for CouplingCompensator {
    fn default() -> Self {
        Self::new()
    }
}

impl CouplingCompensator {
    /// Create a compensator in the unprimed (just reset) state
    pub fn new() -> Self {
        Self {
            revolutions: 0.0,
            primed: false,
        }
    }

    /// Signed cumulative revolutions since the last reset
    pub fn revolutions(&self) -> f32 {
        self.revolutions
    }

    /// Reset after homing or a theta reset: the next move has no position
    /// history, so it re-anchors instead of compensating.
    pub fn reset(&mut self) {
        self.revolutions = 0.0;
        self.primed = false;
    }

    /// Account one commanded move's angular delta and return the radial
    /// step offset to subtract from the naive target.
    ///
    /// The first call after a reset zeroes the counter and returns 0 -
    /// there is no prior position to compensate against.
    pub fn advance(&mut self, delta_theta: f32, config: &TableConfig) -> i32 {
        if !self.primed {
            self.primed = true;
            self.revolutions = 0.0;
            return 0;
        }
        self.revolutions += delta_theta / TWO_PI;
        libm::roundf(self.revolutions * config.coupling_steps_per_rev()) as i32
    }
}

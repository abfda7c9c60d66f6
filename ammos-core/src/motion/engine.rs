//! Dual-axis synchronized motion engine.
//!
//! Converts a polar sample into two absolute step targets and executes
//! one coordinated move: both axes are advanced proportionally and finish
//! on the same tick, so the physical path traces the straight step-space
//! line rather than a staggered L. The firmware's blocking "move to
//! completion" call is modeled as an explicit move-in-progress state
//! advanced by a non-blocking [`MotionEngine::tick`], invoked once per
//! control tick; no new move is accepted while one is active.

use super::position::Position;
use crate::config::TableConfig;

/// Errors from the motion engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// A move is already in progress
    Busy,
}

/// Signed step counts to issue on one tick, per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepDelta {
    /// Angular axis steps (positive = clockwise)
    pub theta: i32,
    /// Radial axis steps (positive = outward)
    pub rho: i32,
}

impl StepDelta {
    /// True if neither axis moves this tick
    pub fn is_zero(&self) -> bool {
        self.theta == 0 && self.rho == 0
    }
}

#[derive(Debug, Clone)]
struct ActiveMove {
    start_theta: i32,
    start_rho: i32,
    target_theta: i32,
    target_rho: i32,
    /// Logical position adopted when the move completes
    target_position: Position,
    total_ticks: u32,
    tick: u32,
}

/// Step-level state of both axes plus the currently executing move
#[derive(Debug, Clone)]
pub struct MotionEngine {
    theta_steps: i32,
    rho_steps: i32,
    position: Position,
    active: Option<ActiveMove>,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionEngine {
    /// Create an engine at the boot origin (0, 0)
    pub fn new() -> Self {
        Self {
            theta_steps: 0,
            rho_steps: 0,
            position: Position::zero(),
            active: None,
        }
    }

    /// Logical position (the last completed target)
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current angular axis step count
    pub fn theta_steps(&self) -> i32 {
        self.theta_steps
    }

    /// Current radial axis step count
    pub fn rho_steps(&self) -> i32 {
        self.rho_steps
    }

    /// Check if a move is in progress
    pub fn is_moving(&self) -> bool {
        self.active.is_some()
    }

    /// Begin a synchronized move to `target`.
    ///
    /// `coupling_offset` is subtracted from the naive radial step target
    /// (see [`super::CouplingCompensator`]); `steps_per_tick` is the rate
    /// for the faster axis. Returns the tick count of the move.
    pub fn begin_move(
        &mut self,
        target: Position,
        coupling_offset: i32,
        steps_per_tick: f32,
        config: &TableConfig,
    ) -> Result<u32, MotionError> {
        if self.active.is_some() {
            return Err(MotionError::Busy);
        }

        let target_theta = config.theta_to_steps(target.theta);
        let target_rho = config.rho_to_steps(target.rho) - coupling_offset;

        // Theta is unbounded, so opposite-sign step counts can span more
        // than i32; widen before taking the distance
        let theta_span = (target_theta as i64 - self.theta_steps as i64).unsigned_abs();
        let rho_span = (target_rho as i64 - self.rho_steps as i64).unsigned_abs();
        let span = theta_span.max(rho_span);
        let rate = if steps_per_tick > 0.0 {
            steps_per_tick
        } else {
            1.0
        };
        let total_ticks = (libm::ceilf(span as f32 / rate) as u64)
            .clamp(1, u32::MAX as u64) as u32;

        self.active = Some(ActiveMove {
            start_theta: self.theta_steps,
            start_rho: self.rho_steps,
            target_theta,
            target_rho,
            target_position: target,
            total_ticks,
            tick: 0,
        });
        Ok(total_ticks)
    }

    /// Advance the active move by one tick.
    ///
    /// Returns the steps to issue this tick (possibly zero on slow moves),
    /// or `None` when no move is active. The move completes on the tick
    /// that returns the final delta; afterwards [`Self::is_moving`] is
    /// false and [`Self::position`] reports the target.
    pub fn tick(&mut self) -> Option<StepDelta> {
        let m = self.active.as_mut()?;
        m.tick += 1;

        let (next_theta, next_rho) = if m.tick >= m.total_ticks {
            (m.target_theta, m.target_rho)
        } else {
            let t = m.tick as f32 / m.total_ticks as f32;
            (
                interpolate(m.start_theta, m.target_theta, t),
                interpolate(m.start_rho, m.target_rho, t),
            )
        };

        let delta = StepDelta {
            theta: next_theta - self.theta_steps,
            rho: next_rho - self.rho_steps,
        };
        self.theta_steps = next_theta;
        self.rho_steps = next_rho;

        if m.tick >= m.total_ticks {
            self.position = m.target_position;
            self.active = None;
        }
        Some(delta)
    }

    /// Abort the active move between ticks (homing preemption). Step
    /// counters keep whatever the last tick issued.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Homing completion: the current physical position becomes the
    /// logical origin.
    pub fn zero(&mut self) {
        self.theta_steps = 0;
        self.rho_steps = 0;
        self.position = Position::zero();
        self.active = None;
    }

    /// Theta reset: rebase the angular axis to zero, keeping rho
    pub fn reset_theta(&mut self) {
        self.theta_steps = 0;
        self.position.theta = 0.0;
    }
}

/// Proportional point between two step counts, widened so distances
/// larger than i32 interpolate without overflow
fn interpolate(start: i32, target: i32, t: f32) -> i32 {
    let stepped = start as i64 + libm::roundf((target as i64 - start as i64) as f32 * t) as i64;
    stepped.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

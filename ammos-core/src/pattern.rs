//! Autonomous rose-curve pattern generation.
//!
//! In autonomous mode the controller feeds itself waypoints instead of
//! waiting on the host: theta advances by a fixed increment each waypoint
//! and rho follows a cosine of the accumulated phase, producing an
//! evolving rose curve. The two panel potentiometers select the
//! oscillation frequency (petal count) and the minimum radius.
//!
//! The phase accumulator is the only carried state: rho is derived from
//! phase, and phase advances by `frequency * d_theta`, so turning the
//! frequency knob changes how fast the petals oscillate from that point
//! on without the curve ever jumping discontinuously.

use ammos_protocol::Waypoint;

/// Theta advance per generated waypoint, radians
pub const THETA_INCREMENT: f32 = 0.1;

/// Oscillation frequency selected by a fully-CCW frequency pot
pub const MIN_FREQUENCY: f32 = 1.0;

/// Oscillation frequency selected by a fully-CW frequency pot
pub const MAX_FREQUENCY: f32 = 8.0;

/// Largest minimum-radius floor the radius pot can select; keeps at least
/// a fifth of the radial range for the oscillation
pub const MAX_MIN_RHO: f32 = 0.8;

/// Self-generating waypoint source for autonomous mode
#[derive(Debug, Clone, Default)]
pub struct RoseGenerator {
    phase: f32,
}

impl RoseGenerator {
    /// Create a generator with zero phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the curve (entering autonomous mode)
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate the next waypoint from the current theta and the two
    /// normalized pot readings (both clamped to [0, 1]).
    pub fn next_waypoint(&mut self, current_theta: f32, frequency_in: f32, min_rho_in: f32) -> Waypoint {
        let frequency = MIN_FREQUENCY
            + frequency_in.clamp(0.0, 1.0) * (MAX_FREQUENCY - MIN_FREQUENCY);
        let min_rho = min_rho_in.clamp(0.0, 1.0) * MAX_MIN_RHO;

        self.phase += frequency * THETA_INCREMENT;
        // Map cos(phase) from [-1, 1] into [min_rho, 1]
        let rho = min_rho + (1.0 - min_rho) * (0.5 + 0.5 * libm::cosf(self.phase));

        Waypoint::new(current_theta + THETA_INCREMENT, rho)
    }
}

//! Logical polar position of the magnet.

use ammos_protocol::Waypoint;

/// One full revolution in radians
pub const TWO_PI: f32 = 2.0 * core::f32::consts::PI;

/// Logical position in polar coordinates.
///
/// Theta is unbounded and accumulates across revolutions - wrapping it
/// would silently discard the revolution history the coupling compensator
/// depends on. Rho is normalized [0, 1] and clamped at step conversion,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    /// Angular position in radians
    pub theta: f32,
    /// Radial position, 0 (center) to 1 (edge)
    pub rho: f32,
}

impl Position {
    /// Create a position
    pub const fn new(theta: f32, rho: f32) -> Self {
        Self { theta, rho }
    }

    /// The boot/home origin
    pub const fn zero() -> Self {
        Self {
            theta: 0.0,
            rho: 0.0,
        }
    }

    /// Euclidean distance to another position in (theta, rho) space
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dt = other.theta - self.theta;
        let dr = other.rho - self.rho;
        libm::sqrtf(dt * dt + dr * dr)
    }
}

impl From<Waypoint> for Position {
    fn from(wp: Waypoint) -> Self {
        Self {
            theta: wp.theta,
            rho: wp.rho,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_origin() {
        let pos = Position::zero();
        assert_eq!(pos.theta, 0.0);
        assert_eq!(pos.rho, 0.0);
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 0.0);
        assert_eq!(a.distance_to(&b), 3.0);

        let c = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(&c), 5.0);
        // Distance is symmetric
        assert_eq!(c.distance_to(&a), 5.0);
    }

    #[test]
    fn test_from_waypoint() {
        let pos: Position = Waypoint::new(1.5708, 0.7).into();
        assert_eq!(pos, Position::new(1.5708, 0.7));
    }
}

//! Axis driver trait
//!
//! Abstracts over step/dir stepper drivers (A4988, DRV8825, TMC2209 in
//! legacy standalone mode) for the two table axes.

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise rotation / outward radial travel
    Clockwise,
    /// Counter-clockwise rotation / inward radial travel
    CounterClockwise,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Direction for a signed step delta (positive = clockwise/outward)
    pub fn from_delta(delta: i32) -> Self {
        if delta >= 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}

/// Trait for a single stepper axis driver
///
/// Implementations generate the electrical step/dir/enable signals; the
/// core decides when and how many pulses to issue. Drivers are enabled
/// only during active motion or homing so the motors can power down
/// between batches.
pub trait AxisDriver {
    /// Set the rotation direction for subsequent pulses
    fn set_direction(&mut self, dir: Direction);

    /// Issue one step pulse
    fn step(&mut self);

    /// Energize the driver (hold position)
    fn enable(&mut self);

    /// De-energize the driver (free rotation, no holding torque)
    fn disable(&mut self);

    /// Check if the driver is energized
    fn is_enabled(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Clockwise.opposite(), Direction::CounterClockwise);
        assert_eq!(Direction::CounterClockwise.opposite(), Direction::Clockwise);
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(5), Direction::Clockwise);
        assert_eq!(Direction::from_delta(0), Direction::Clockwise);
        assert_eq!(Direction::from_delta(-3), Direction::CounterClockwise);
    }
}

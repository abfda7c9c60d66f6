//! Segment subdivision between consecutive waypoints.
//!
//! Each segment is cut into sub-steps of a fixed size in (theta, rho)
//! space; both coordinates are interpolated linearly so the traced path is
//! the straight line between the endpoints. The step size is a tunable
//! constant, not adapted dynamically.

use super::position::Position;

/// Iterator over the sub-step targets of one segment.
///
/// Yields at least one target; the final target is exactly the segment
/// endpoint (assigned, not computed, so float accumulation can never leave
/// the logical position short of the waypoint).
#[derive(Debug, Clone)]
pub struct SegmentInterpolator {
    from: Position,
    to: Position,
    total: u32,
    index: u32,
}

impl SegmentInterpolator {
    /// Subdivide the segment `from -> to` with the given fixed step size
    pub fn new(from: Position, to: Position, step_size: f32) -> Self {
        let distance = from.distance_to(&to);
        let total = if step_size > 0.0 {
            (libm::ceilf(distance / step_size) as u32).max(1)
        } else {
            1
        };
        Self {
            from,
            to,
            total,
            index: 0,
        }
    }

    /// Number of sub-steps this segment produces
    pub fn len(&self) -> u32 {
        self.total
    }
}

impl Iterator for SegmentInterpolator {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.index >= self.total {
            return None;
        }
        self.index += 1;
        if self.index == self.total {
            return Some(self.to);
        }
        let t = self.index as f32 / self.total as f32;
        Some(Position::new(
            self.from.theta + (self.to.theta - self.from.theta) * t,
            self.from.rho + (self.to.rho - self.from.rho) * t,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_exactly_at_endpoint() {
        let from = Position::new(0.0, 0.5);
        let to = Position::new(1.5708, 0.7);
        let last = SegmentInterpolator::new(from, to, 0.1).last().unwrap();
        assert_eq!(last, to);
    }

    #[test]
    fn test_substep_count_from_distance() {
        let from = Position::zero();
        let to = Position::new(1.0, 0.0);
        // Distance 1.0 at step 0.1 -> 10 sub-steps
        let interp = SegmentInterpolator::new(from, to, 0.1);
        assert_eq!(interp.len(), 10);
        assert_eq!(interp.count(), 10);
    }

    #[test]
    fn test_minimum_one_substep() {
        let from = Position::new(2.0, 0.3);
        // Zero-length segment still yields the endpoint once
        let mut interp = SegmentInterpolator::new(from, from, 0.1);
        assert_eq!(interp.len(), 1);
        assert_eq!(interp.next(), Some(from));
        assert_eq!(interp.next(), None);
    }

    #[test]
    fn test_linear_in_both_coordinates() {
        let from = Position::new(0.0, 0.0);
        let to = Position::new(2.0, 1.0);
        let interp = SegmentInterpolator::new(from, to, 0.5);
        for (i, p) in interp.clone().enumerate() {
            let t = (i + 1) as f32 / interp.len() as f32;
            assert!(libm::fabsf(p.theta - 2.0 * t) < 1e-5);
            assert!(libm::fabsf(p.rho - t) < 1e-5);
        }
    }

    #[test]
    fn test_targets_are_monotonic() {
        let interp = SegmentInterpolator::new(Position::zero(), Position::new(-3.0, 1.0), 0.25);
        let mut prev_theta = 0.0;
        for p in interp {
            assert!(p.theta < prev_theta);
            prev_theta = p.theta;
        }
    }
}

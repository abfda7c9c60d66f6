//! Motion pipeline: polar positions, path interpolation, coupling
//! compensation, and the synchronized dual-axis step engine.
//!
//! Data flows waypoint-by-waypoint: the interpolator subdivides a segment
//! into sub-steps, the compensator removes the radial side-effect of
//! accumulated angular travel from each sub-step target, and the engine
//! turns the corrected target into one synchronized move advanced tick by
//! tick.

mod coupling;
mod engine;
mod interpolator;
mod position;

pub use coupling::CouplingCompensator;
pub use engine::{MotionEngine, MotionError, StepDelta};
pub use interpolator::SegmentInterpolator;
pub use position::{Position, TWO_PI};

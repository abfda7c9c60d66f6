//! Fixed-capacity waypoint batch buffer.
//!
//! Holds the batch currently pending or under execution. The buffer is
//! filled by exactly one parser pass of one input line (partial fills are
//! valid) and refuses a new batch until the previous one has been cleared
//! after execution - the host's `R` acknowledgement is the signal that the
//! buffer is free again.

use ammos_protocol::{Waypoint, MAX_BATCH_WAYPOINTS};
use heapless::Vec;

/// Errors from the batch buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// A batch is already pending or executing
    Busy,
}

/// Ordered store of the pending batch's waypoints
#[derive(Debug, Clone, Default)]
pub struct BatchBuffer {
    waypoints: Vec<Waypoint, MAX_BATCH_WAYPOINTS>,
    cursor: usize,
}

impl BatchBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a batch is pending or executing
    pub fn is_active(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Waypoints not yet handed to the interpolator
    pub fn remaining(&self) -> usize {
        self.waypoints.len() - self.cursor
    }

    /// Accept a new batch. Fails while a previous batch is still active.
    pub fn load(&mut self, waypoints: &[Waypoint]) -> Result<(), BufferError> {
        if self.is_active() {
            return Err(BufferError::Busy);
        }
        self.cursor = 0;
        // The parser enforces the capacity; truncation here is unreachable
        // but harmless.
        for wp in waypoints.iter().take(MAX_BATCH_WAYPOINTS) {
            let _ = self.waypoints.push(*wp);
        }
        Ok(())
    }

    /// Hand the next waypoint to the interpolator, in received order
    pub fn take_next(&mut self) -> Option<Waypoint> {
        let wp = self.waypoints.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(wp)
    }

    /// Discard the batch once execution finishes (or is preempted)
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
    }
}

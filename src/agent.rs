//! Agents are the mobile entities whose trajectories are replayed.
use anyhow::{Result, ensure};

/// The radius used for roadmap agents when the task file doesn't give one
pub const DEFAULT_ROADMAP_RADIUS: f64 = 0.4;

/// A single agent with a physical size
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Radius of the agent's footprint, in map units
    pub radius: f64,
}

impl Agent {
    /// Create a new agent, checking that the radius is positive and finite
    pub fn new(radius: f64) -> Result<Self> {
        ensure!(
            radius.is_finite() && radius > 0.0,
            "Agent radius must be a positive number, got {radius}"
        );

        Ok(Self { radius })
    }
}

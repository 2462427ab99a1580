//! Sampling an agent's position along its plan at an arbitrary time.
//!
//! A plan is a sequence of constant-velocity sections. The position at time `t` is found by
//! walking the sections in order until the one active at `t` is reached, then interpolating
//! linearly within it. Once the plan is complete the agent holds at its final waypoint.
use crate::geometry::Point;
use crate::solution::PlanSection;
use std::error::Error;
use std::fmt;

/// Indicates that a position could not be sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleError {
    /// The plan has no sections
    InvalidPlan,
    /// The query time is negative or not a number
    InvalidQuery(f64),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidPlan => write!(f, "Cannot sample a plan with no sections"),
            Self::InvalidQuery(t) => write!(f, "Invalid query time: {t}"),
        }
    }
}

impl Error for SampleError {}

/// The total time taken to traverse the given sections
pub fn total_duration(sections: &[PlanSection]) -> f64 {
    sections.iter().map(|section| section.duration).sum()
}

/// Get the interpolated position at time `t` along the given sections.
///
/// # Arguments
///
/// * `sections` - The agent's plan sections, in order
/// * `t` - The query time, which must be non-negative
///
/// # Returns
///
/// The position at `t`, or the final section's goal if `t` is at or past the end of the plan.
pub fn position_at(sections: &[PlanSection], t: f64) -> Result<Point, SampleError> {
    let Some(last) = sections.last() else {
        return Err(SampleError::InvalidPlan);
    };
    if !(t >= 0.0 && t.is_finite()) {
        return Err(SampleError::InvalidQuery(t));
    }

    let mut remainder = t;
    for section in sections {
        if remainder < section.duration {
            return Ok(section.interpolate(remainder));
        }
        remainder -= section.duration;
    }

    // Hold at the last waypoint
    Ok(last.goal)
}

impl PlanSection {
    /// The position `elapsed` time units after entering this section.
    ///
    /// A zero-duration section is treated as already complete.
    pub fn interpolate(&self, elapsed: f64) -> Point {
        let alpha = if self.duration > 0.0 {
            (elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        self.start.lerp(self.goal, alpha)
    }
}

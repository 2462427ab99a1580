//! Solutions: timed motion plans for every agent in a task.
use crate::agent::Agent;
use crate::geometry::Point;
use crate::trajectory::{self, SampleError};
use std::rc::Rc;

/// One constant-velocity leg of an agent's motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSection {
    /// Where the leg starts
    pub start: Point,
    /// Where the leg ends
    pub goal: Point,
    /// Time taken to traverse the leg
    pub duration: f64,
}

/// The complete timed trajectory of one agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPlan {
    /// The agent following this plan
    pub agent: Rc<Agent>,
    /// The plan's sections, in the order they are traversed
    pub sections: Vec<PlanSection>,
}

impl AgentPlan {
    /// Time at which the agent reaches the end of its plan
    pub fn total_duration(&self) -> f64 {
        trajectory::total_duration(&self.sections)
    }

    /// The agent's position at time `t`
    pub fn position_at(&self, t: f64) -> Result<Point, SampleError> {
        trajectory::position_at(&self.sections, t)
    }

    /// Where the plan starts
    pub fn first_start(&self) -> Option<Point> {
        self.sections.first().map(|section| section.start)
    }

    /// Where the plan ends
    pub fn last_goal(&self) -> Option<Point> {
        self.sections.last().map(|section| section.goal)
    }
}

/// A solution to a task
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// CPU time the solver reported using
    pub cpu_time: f64,
    /// Sum of agents' completion times, as reported by the solver
    pub flowtime: f64,
    /// Completion time of the last agent, as reported by the solver
    pub makespan: f64,
    /// One plan per agent, indexed by agent ID
    pub plans: Vec<AgentPlan>,
}

impl Solution {
    /// Number of agent plans
    pub fn num_agents(&self) -> usize {
        self.plans.len()
    }

    /// The makespan implied by the plans themselves
    pub fn computed_makespan(&self) -> f64 {
        self.plans
            .iter()
            .map(AgentPlan::total_duration)
            .fold(0.0, f64::max)
    }

    /// The flowtime implied by the plans themselves
    pub fn computed_flowtime(&self) -> f64 {
        self.plans.iter().map(AgentPlan::total_duration).sum()
    }

    /// Every agent's position at time `t`, in agent ID order
    pub fn positions_at(&self, t: f64) -> Result<Vec<Point>, SampleError> {
        self.plans.iter().map(|plan| plan.position_at(t)).collect()
    }
}

//! A loaded scenario: the map, the task and its solution.
use crate::geometry::Point;
use crate::map::{Map, MapKind};
use crate::solution::Solution;
use crate::task::{Endpoint, Task};
use crate::trajectory::SampleError;
use anyhow::{Result, ensure};
use log::warn;

/// Everything needed to replay a solution
#[derive(Debug, Clone)]
pub struct Scenario {
    /// The map agents move on
    pub map: Map,
    /// Agents' starts and goals
    pub task: Task,
    /// Agents' timed plans
    pub solution: Solution,
}

impl Scenario {
    /// Create a new scenario.
    ///
    /// The solution must have one plan per agent in the task. Plans that don't begin at their
    /// agent's start or finish at its goal are reported as warnings; they can still be replayed.
    pub fn new(map: Map, task: Task, solution: Solution) -> Result<Self> {
        ensure!(
            solution.num_agents() == task.num_agents(),
            "Solution has plans for {} agents, but the task has {} agents",
            solution.num_agents(),
            task.num_agents()
        );

        let scenario = Self {
            map,
            task,
            solution,
        };
        scenario.warn_on_endpoint_mismatch();

        Ok(scenario)
    }

    /// The kind of map the scenario is played on
    pub fn kind(&self) -> MapKind {
        self.map.kind()
    }

    /// Number of agents
    pub fn num_agents(&self) -> usize {
        self.task.num_agents()
    }

    fn resolve_all(&self, get: impl Fn(usize) -> Option<Endpoint>) -> Vec<Option<Point>> {
        (0..self.num_agents())
            .map(|id| get(id).and_then(|endpoint| endpoint.resolve(&self.map).ok()))
            .collect()
    }

    /// Each agent's start position according to the task
    pub fn start_positions(&self) -> Vec<Option<Point>> {
        self.resolve_all(|id| self.task.entry(id).map(|entry| entry.start))
    }

    /// Each agent's goal position according to the task
    pub fn goal_positions(&self) -> Vec<Option<Point>> {
        self.resolve_all(|id| self.task.entry(id).map(|entry| entry.goal))
    }

    /// Every agent's position at time `t`
    pub fn positions_at(&self, t: f64) -> Result<Vec<Point>, SampleError> {
        self.solution.positions_at(t)
    }

    fn warn_on_endpoint_mismatch(&self) {
        let mismatch = |expected: Option<Point>, actual: Option<Point>| match (expected, actual) {
            (Some(expected), Some(actual)) if expected.dist_to(actual) > 1e-6 => {
                Some((expected, actual))
            }
            _ => None,
        };

        let endpoints = self.start_positions().into_iter().zip(self.goal_positions());
        for (id, (plan, (start, goal))) in self.solution.plans.iter().zip(endpoints).enumerate() {
            if let Some((expected, actual)) = mismatch(start, plan.first_start()) {
                warn!("Plan for agent {id} starts at {actual}, but the task starts it at {expected}");
            }
            if let Some((expected, actual)) = mismatch(goal, plan.last_goal()) {
                warn!("Plan for agent {id} ends at {actual}, but the task's goal is {expected}");
            }
        }
    }
}

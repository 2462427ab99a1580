//! Tasks assign each agent a start and a goal.
use crate::agent::Agent;
use crate::geometry::Point;
use crate::map::{Map, MapKind, task_node_id};
use anyhow::{Context, Result, bail, ensure};
use std::fmt;
use std::rc::Rc;

/// Where an agent starts or finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// A grid cell, given as (row, column)
    Cell {
        /// Row
        i: i64,
        /// Column
        j: i64,
    },
    /// A roadmap node, given as the numeric part of its ID
    Node(u32),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Cell { i, j } => write!(f, "cell ({i}, {j})"),
            Endpoint::Node(node) => write!(f, "node {}", task_node_id(*node)),
        }
    }
}

impl Endpoint {
    /// Resolve the endpoint to a position on the given map
    #[allow(clippy::cast_precision_loss)]
    pub fn resolve(&self, map: &Map) -> Result<Point> {
        match (self, map) {
            (Endpoint::Cell { i, j }, Map::Grid(grid)) => {
                ensure!(grid.contains(*i, *j), "{self} is outside the map");

                Ok(Point::new(*i as f64, *j as f64))
            }
            (Endpoint::Node(node), Map::Roadmap(roadmap)) => roadmap
                .coords_of_task_node(*node)
                .with_context(|| format!("{self} is not in the roadmap")),
            _ => bail!("{self} cannot be used with a {} map", map.kind()),
        }
    }
}

/// One agent's assignment
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEntry {
    /// The agent being assigned
    pub agent: Rc<Agent>,
    /// Where the agent starts
    pub start: Endpoint,
    /// Where the agent must go
    pub goal: Endpoint,
}

/// The full set of assignments, indexed by agent ID
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// The kind of map this task was written for
    pub kind: MapKind,
    entries: Vec<TaskEntry>,
}

impl Task {
    /// Create a task from its entries, in agent ID order
    pub fn new(kind: MapKind, entries: Vec<TaskEntry>) -> Result<Self> {
        ensure!(!entries.is_empty(), "Task must contain at least one agent");
        for (id, entry) in entries.iter().enumerate() {
            for endpoint in [&entry.start, &entry.goal] {
                let kind_matches = matches!(
                    (kind, endpoint),
                    (MapKind::Grid, Endpoint::Cell { .. }) | (MapKind::Roadmap, Endpoint::Node(_))
                );
                ensure!(kind_matches, "Agent {id}: {endpoint} is not valid for a {kind} task");
            }
        }

        Ok(Self { kind, entries })
    }

    /// Number of agents in the task
    pub fn num_agents(&self) -> usize {
        self.entries.len()
    }

    /// Get the entry for the given agent
    pub fn entry(&self, id: usize) -> Option<&TaskEntry> {
        self.entries.get(id)
    }

    /// Get the agent with the given ID
    pub fn agent(&self, id: usize) -> Option<&Rc<Agent>> {
        self.entry(id).map(|entry| &entry.agent)
    }

    /// Check that every start and goal lies on the map
    pub fn check_against_map(&self, map: &Map) -> Result<()> {
        for (id, entry) in self.entries.iter().enumerate() {
            entry
                .start
                .resolve(map)
                .with_context(|| format!("Invalid start for agent {id}"))?;
            entry
                .goal
                .resolve(map)
                .with_context(|| format!("Invalid goal for agent {id}"))?;
        }

        Ok(())
    }
}

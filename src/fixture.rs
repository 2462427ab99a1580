//! Fixtures for tests

use crate::agent::Agent;
use crate::geometry::Point;
use crate::map::{GridMap, Map, MapKind, Roadmap};
use crate::scenario::Scenario;
use crate::solution::{AgentPlan, PlanSection, Solution};
use crate::task::{Endpoint, Task, TaskEntry};
use rstest::fixture;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Assert that two points are equal, within numeric tolerance
macro_rules! assert_point_eq {
    ($actual:expr, $expected:expr) => {{
        let actual: $crate::geometry::Point = $actual;
        let expected: $crate::geometry::Point = $expected;
        float_cmp::assert_approx_eq!(f64, actual.i, expected.i, epsilon = 1e-9);
        float_cmp::assert_approx_eq!(f64, actual.j, expected.j, epsilon = 1e-9);
    }};
}
pub(crate) use assert_point_eq;

/// Make a plan section from (i, j) pairs
pub fn section(start: (f64, f64), goal: (f64, f64), duration: f64) -> PlanSection {
    PlanSection {
        start: Point::new(start.0, start.1),
        goal: Point::new(goal.0, goal.1),
        duration,
    }
}

#[fixture]
pub fn agent() -> Rc<Agent> {
    Rc::new(Agent { radius: 0.3 })
}

#[fixture]
pub fn grid_map_3x3() -> GridMap {
    GridMap::new("test".into(), 3, 3, vec![vec![false; 3]; 3]).unwrap()
}

#[fixture]
pub fn grid_task(agent: Rc<Agent>) -> Task {
    Task::new(
        MapKind::Grid,
        vec![TaskEntry {
            agent,
            start: Endpoint::Cell { i: 0, j: 0 },
            goal: Endpoint::Cell { i: 2, j: 2 },
        }],
    )
    .unwrap()
}

#[fixture]
pub fn two_section_plan() -> Vec<PlanSection> {
    vec![
        section((0.0, 0.0), (1.0, 0.0), 1.0),
        section((1.0, 0.0), (1.0, 4.0), 3.0),
    ]
}

#[fixture]
pub fn grid_solution(agent: Rc<Agent>, two_section_plan: Vec<PlanSection>) -> Solution {
    Solution {
        cpu_time: 0.01,
        flowtime: 6.0,
        makespan: 4.0,
        plans: vec![
            AgentPlan {
                agent: agent.clone(),
                sections: vec![section((0.0, 0.0), (2.0, 2.0), 2.0)],
            },
            AgentPlan {
                agent,
                sections: two_section_plan,
            },
        ],
    }
}

#[fixture]
pub fn roadmap() -> Roadmap {
    let mut roadmap = Roadmap::default();
    roadmap.add_node("n0", Point::new(0.0, 0.0)).unwrap();
    roadmap.add_node("n1", Point::new(3.0, 4.0)).unwrap();
    roadmap.add_node("n2", Point::new(3.0, 6.5)).unwrap();
    roadmap.add_edge("n0", "n1", None).unwrap();
    roadmap.add_edge("n1", "n2", Some(2.5)).unwrap();
    roadmap
}

/// One agent crossing a 3x3 grid diagonally, from (0, 0) to (2, 2) over 2 time units
#[fixture]
pub fn grid_scenario(grid_map_3x3: GridMap, grid_task: Task) -> Scenario {
    let agent = grid_task.agent(0).unwrap().clone();
    let solution = Solution {
        cpu_time: 0.0,
        flowtime: 2.0,
        makespan: 2.0,
        plans: vec![AgentPlan {
            agent,
            sections: vec![section((0.0, 0.0), (2.0, 2.0), 2.0)],
        }],
    };
    Scenario::new(Map::Grid(grid_map_3x3), grid_task, solution).unwrap()
}

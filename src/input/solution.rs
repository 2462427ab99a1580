//! Code for reading solution files.
use super::*;
use crate::geometry::Point;
use crate::solution::{AgentPlan, PlanSection, Solution};
use crate::task::Task;
use anyhow::ensure;
use float_cmp::approx_eq;
use log::warn;
use serde::Deserialize;

/// The root of a solution file
#[derive(Debug, Deserialize)]
struct SolutionFileRaw {
    log: Option<LogRaw>,
}

/// The `<log>` element, holding the summary and every agent's path
#[derive(Debug, Deserialize)]
struct LogRaw {
    summary: Option<SummaryRaw>,
    #[serde(rename = "agent", default)]
    agents: Vec<LogAgentRaw>,
}

#[derive(Debug, Deserialize)]
struct SummaryRaw {
    #[serde(rename = "@time")]
    time: Option<String>,
    #[serde(rename = "@flowtime")]
    flowtime: Option<String>,
    #[serde(rename = "@makespan")]
    makespan: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogAgentRaw {
    #[serde(rename = "@number")]
    number: Option<String>,
    path: Option<PathRaw>,
}

#[derive(Debug, Deserialize)]
struct PathRaw {
    #[serde(rename = "section", default)]
    sections: Vec<SectionRaw>,
}

#[derive(Debug, Deserialize)]
struct SectionRaw {
    #[serde(rename = "@number")]
    number: Option<String>,
    #[serde(rename = "@start_i")]
    start_i: Option<String>,
    #[serde(rename = "@start_j")]
    start_j: Option<String>,
    #[serde(rename = "@goal_i")]
    goal_i: Option<String>,
    #[serde(rename = "@goal_j")]
    goal_j: Option<String>,
    #[serde(rename = "@duration")]
    duration: Option<String>,
}

/// Read the solution to the given task from a file.
///
/// # Arguments
///
/// * `file_path` - Path to the solution file
/// * `task` - The task this is a solution to. Agent attributes are taken from here.
pub fn read_solution(file_path: &Path, task: &Task) -> Result<Solution> {
    read_file(file_path)
        .and_then(|contents| read_solution_from_str(&contents, task))
        .with_context(|| InputError::new(InputKind::Solution, file_path))
}

fn read_solution_from_str(contents: &str, task: &Task) -> Result<Solution> {
    let raw: SolutionFileRaw = parse_xml(contents)?;
    let log = raw.log.context("Missing <log> element")?;
    let summary = log.summary.context("Missing <summary> element")?;

    let num_agents = task.num_agents();
    let mut plans: Vec<Option<AgentPlan>> = vec![None; num_agents];
    for agent in &log.agents {
        let id: usize = parse_field("agent number", agent.number.as_deref())?;
        let task_agent = task.agent(id).with_context(|| {
            format!("Agent number {id} is out of range: the task has {num_agents} agents")
        })?;
        ensure!(plans[id].is_none(), "Duplicate plan for agent {id}");

        let path = agent
            .path
            .as_ref()
            .with_context(|| format!("Missing <path> for agent {id}"))?;
        let sections = read_plan_sections(&path.sections, task.kind)
            .with_context(|| format!("Invalid path for agent {id}"))?;
        plans[id] = Some(AgentPlan {
            agent: task_agent.clone(),
            sections,
        });
    }

    let plans = plans
        .into_iter()
        .enumerate()
        .map(|(id, plan)| plan.with_context(|| format!("No plan for agent {id}")))
        .collect::<Result<_>>()?;

    let solution = Solution {
        cpu_time: parse_non_negative("time", summary.time.as_deref())?,
        flowtime: parse_non_negative("flowtime", summary.flowtime.as_deref())?,
        makespan: parse_non_negative("makespan", summary.makespan.as_deref())?,
        plans,
    };

    let computed = solution.computed_makespan();
    if !approx_eq!(f64, solution.makespan, computed, epsilon = 1e-6) {
        warn!(
            "Reported makespan ({}) differs from the length of the longest plan ({computed})",
            solution.makespan
        );
    }
    let computed = solution.computed_flowtime();
    if !approx_eq!(f64, solution.flowtime, computed, epsilon = 1e-6) {
        warn!(
            "Reported flowtime ({}) differs from the sum of plan lengths ({computed})",
            solution.flowtime
        );
    }

    Ok(solution)
}

/// Read the sections of one agent's path.
///
/// Section numbers must run 0, 1, 2, … in file order. Grid coordinates must be integers.
fn read_plan_sections(raw: &[SectionRaw], kind: MapKind) -> Result<Vec<PlanSection>> {
    ensure!(!raw.is_empty(), "Path has no sections");

    let mut sections = Vec::with_capacity(raw.len());
    for (expected, section) in raw.iter().enumerate() {
        let number: usize = parse_field("section number", section.number.as_deref())?;
        ensure!(
            number == expected,
            "Section numbers must be contiguous from 0: expected {expected}, found {number}"
        );

        let read_section = || -> Result<PlanSection> {
            let point = |i: &Option<String>, j: &Option<String>, prefix: &str| {
                read_point(i.as_deref(), j.as_deref(), prefix, kind)
            };
            Ok(PlanSection {
                start: point(&section.start_i, &section.start_j, "start")?,
                goal: point(&section.goal_i, &section.goal_j, "goal")?,
                duration: parse_non_negative("duration", section.duration.as_deref())?,
            })
        };
        sections.push(read_section().with_context(|| format!("Invalid section {number}"))?);
    }

    Ok(sections)
}

/// Read a pair of coordinate attributes, e.g. `start_i` and `start_j`
#[allow(clippy::cast_precision_loss)]
fn read_point(i: Option<&str>, j: Option<&str>, prefix: &str, kind: MapKind) -> Result<Point> {
    let (i_field, j_field) = (format!("{prefix}_i"), format!("{prefix}_j"));
    Ok(match kind {
        MapKind::Grid => Point::new(
            parse_field::<i64>(&i_field, i)? as f64,
            parse_field::<i64>(&j_field, j)? as f64,
        ),
        MapKind::Roadmap => Point::new(parse_field(&i_field, i)?, parse_field(&j_field, j)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, assert_point_eq, grid_task};
    use crate::task::{Endpoint, TaskEntry};
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};
    use std::fs::File;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::tempdir;

    const GRID_SOLUTION: &str = r#"<?xml version="1.0" ?>
<root>
  <log>
    <summary time="0.002" flowtime="4" makespan="4"/>
    <agent number="0">
      <path>
        <section number="0" start_i="0" start_j="0" goal_i="1" goal_j="0" duration="1"/>
        <section number="1" start_i="1" start_j="0" goal_i="1" goal_j="2" duration="3"/>
      </path>
    </agent>
  </log>
</root>"#;

    #[fixture]
    fn roadmap_task() -> Task {
        let agent = Rc::new(crate::agent::Agent { radius: 0.4 });
        let entry = |start, goal| TaskEntry {
            agent: agent.clone(),
            start: Endpoint::Node(start),
            goal: Endpoint::Node(goal),
        };
        Task::new(MapKind::Roadmap, vec![entry(0, 1), entry(1, 0)]).unwrap()
    }

    #[rstest]
    fn test_read_grid_solution(grid_task: Task) {
        let solution = read_solution_from_str(GRID_SOLUTION, &grid_task).unwrap();
        assert_approx_eq!(f64, solution.cpu_time, 0.002);
        assert_approx_eq!(f64, solution.flowtime, 4.0);
        assert_approx_eq!(f64, solution.makespan, 4.0);
        assert_eq!(solution.num_agents(), 1);

        let plan = &solution.plans[0];
        assert!(Rc::ptr_eq(&plan.agent, grid_task.agent(0).unwrap()));
        assert_eq!(plan.sections.len(), 2);
        assert_point_eq!(plan.sections[1].goal, Point::new(1.0, 2.0));
        assert_approx_eq!(f64, plan.sections[1].duration, 3.0);
    }

    #[rstest]
    fn test_read_roadmap_solution(roadmap_task: Task) {
        let contents = r#"<root><log>
            <summary time="0.1" flowtime="7.5" makespan="5.0"/>
            <agent number="1"><path>
                <section number="0" start_i="3.0" start_j="4.0" goal_i="0.0" goal_j="0.0" duration="5.0"/>
            </path></agent>
            <agent number="0"><path>
                <section number="0" start_i="0.0" start_j="0.0" goal_i="1.5" goal_j="2.0" duration="2.5"/>
            </path></agent>
        </log></root>"#;
        let solution = read_solution_from_str(contents, &roadmap_task).unwrap();
        assert_approx_eq!(f64, solution.flowtime, 7.5);
        assert_point_eq!(solution.plans[0].sections[0].goal, Point::new(1.5, 2.0));
        assert_point_eq!(solution.plans[1].sections[0].start, Point::new(3.0, 4.0));
    }

    #[rstest]
    fn test_read_solution_section_gap(grid_task: Task) {
        let contents = GRID_SOLUTION.replace("section number=\"1\"", "section number=\"2\"");
        let err = read_solution_from_str(&contents, &grid_task).unwrap_err();
        assert_eq!(err.to_string(), "Invalid path for agent 0");
        assert_eq!(
            err.chain().last().unwrap().to_string(),
            "Section numbers must be contiguous from 0: expected 1, found 2"
        );
    }

    #[rstest]
    #[case(GRID_SOLUTION.replace("section number=\"1\"", "section number=\"0\""), "Invalid path for agent 0")]
    #[case(GRID_SOLUTION.replace("agent number=\"0\"", "agent number=\"1\""), "Agent number 1 is out of range: the task has 1 agents")]
    #[case(GRID_SOLUTION.replace("<summary time=\"0.002\" flowtime=\"4\" makespan=\"4\"/>", ""), "Missing <summary> element")]
    #[case(GRID_SOLUTION.replace("makespan=\"4\"", ""), "Missing field: makespan")]
    #[case(GRID_SOLUTION.replace("goal_j=\"2\"", "goal_j=\"2.5\""), "Invalid path for agent 0")]
    #[case(GRID_SOLUTION.replace("duration=\"3\"", "duration=\"-3\""), "Invalid path for agent 0")]
    #[case(GRID_SOLUTION.replace("<log>", "<lag>").replace("</log>", "</lag>"), "Missing <log> element")]
    fn test_read_solution_invalid(
        grid_task: Task,
        #[case] contents: String,
        #[case] msg: &str,
    ) {
        assert_error!(read_solution_from_str(&contents, &grid_task), msg);
    }

    #[rstest]
    fn test_read_solution_missing_agent(roadmap_task: Task) {
        let contents = r#"<root><log>
            <summary time="0.1" flowtime="1" makespan="1"/>
            <agent number="0"><path>
                <section number="0" start_i="0" start_j="0" goal_i="1" goal_j="0" duration="1"/>
            </path></agent>
        </log></root>"#;
        assert_error!(
            read_solution_from_str(contents, &roadmap_task),
            "No plan for agent 1"
        );
    }

    #[rstest]
    fn test_read_solution_duplicate_agent(grid_task: Task) {
        let agent = GRID_SOLUTION
            .split_once("<agent")
            .and_then(|(_, rest)| rest.split_once("</agent>"))
            .map(|(body, _)| format!("<agent{body}</agent>"))
            .unwrap();
        let contents = GRID_SOLUTION.replace("</log>", &format!("{agent}</log>"));
        assert_error!(
            read_solution_from_str(&contents, &grid_task),
            "Duplicate plan for agent 0"
        );
    }

    #[rstest]
    fn test_read_solution_empty_path(grid_task: Task) {
        let contents = r#"<root><log>
            <summary time="0" flowtime="0" makespan="0"/>
            <agent number="0"><path/></agent>
        </log></root>"#;
        let err = read_solution_from_str(contents, &grid_task).unwrap_err();
        assert_eq!(err.chain().last().unwrap().to_string(), "Path has no sections");
    }

    #[rstest]
    fn test_read_solution_file(grid_task: Task) {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("solution.xml");
        {
            let mut file = File::create(&file_path).unwrap();
            write!(
                file,
                "{}",
                GRID_SOLUTION.replace("section number=\"1\"", "section number=\"2\"")
            )
            .unwrap();
        }

        let err = read_solution(&file_path, &grid_task).unwrap_err();
        assert_eq!(
            err.downcast_ref::<InputError>(),
            Some(&InputError::new(InputKind::Solution, &file_path))
        );
    }
}

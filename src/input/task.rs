//! Code for reading task files.
use super::*;
use crate::agent::{Agent, DEFAULT_ROADMAP_RADIUS};
use crate::task::{Endpoint, Task, TaskEntry};
use serde::Deserialize;
use std::rc::Rc;

/// The root of a task file
#[derive(Debug, Deserialize)]
struct TaskFileRaw {
    #[serde(rename = "agent", default)]
    agents: Vec<TaskAgentRaw>,
}

/// An `<agent>` element of a task file.
///
/// Grid tasks use the `start_i`/`start_j`/`goal_i`/`goal_j` attributes; roadmap tasks use
/// `start_id`/`goal_id`.
#[derive(Debug, Deserialize)]
struct TaskAgentRaw {
    #[serde(rename = "@radius")]
    radius: Option<String>,
    #[serde(rename = "@start_i")]
    start_i: Option<String>,
    #[serde(rename = "@start_j")]
    start_j: Option<String>,
    #[serde(rename = "@goal_i")]
    goal_i: Option<String>,
    #[serde(rename = "@goal_j")]
    goal_j: Option<String>,
    #[serde(rename = "@start_id")]
    start_id: Option<String>,
    #[serde(rename = "@goal_id")]
    goal_id: Option<String>,
}

/// Read a task for the given kind of map from a file
pub fn read_task(file_path: &Path, kind: MapKind) -> Result<Task> {
    read_file(file_path)
        .and_then(|contents| read_task_from_str(&contents, kind))
        .with_context(|| InputError::new(InputKind::Task, file_path))
}

fn read_task_from_str(contents: &str, kind: MapKind) -> Result<Task> {
    let raw: TaskFileRaw = parse_xml(contents)?;
    let entries = raw
        .agents
        .iter()
        .enumerate()
        .map(|(id, agent)| {
            read_task_entry(agent, kind).with_context(|| format!("Invalid entry for agent {id}"))
        })
        .collect::<Result<_>>()?;

    Task::new(kind, entries)
}

fn read_task_entry(raw: &TaskAgentRaw, kind: MapKind) -> Result<TaskEntry> {
    let entry = match kind {
        MapKind::Grid => {
            let radius = parse_field("radius", raw.radius.as_deref())?;
            TaskEntry {
                agent: Rc::new(Agent::new(radius)?),
                start: Endpoint::Cell {
                    i: parse_field("start_i", raw.start_i.as_deref())?,
                    j: parse_field("start_j", raw.start_j.as_deref())?,
                },
                goal: Endpoint::Cell {
                    i: parse_field("goal_i", raw.goal_i.as_deref())?,
                    j: parse_field("goal_j", raw.goal_j.as_deref())?,
                },
            }
        }
        MapKind::Roadmap => {
            // Roadmap tasks may leave out the radius
            let radius = match raw.radius.as_deref() {
                Some(radius) => parse_field("radius", Some(radius))?,
                None => DEFAULT_ROADMAP_RADIUS,
            };
            TaskEntry {
                agent: Rc::new(Agent::new(radius)?),
                start: Endpoint::Node(parse_field("start_id", raw.start_id.as_deref())?),
                goal: Endpoint::Node(parse_field("goal_id", raw.goal_id.as_deref())?),
            }
        }
    };

    Ok(entry)
}

//! Integration tests for sampling positions from scenarios loaded from disk.
use float_cmp::assert_approx_eq;
use mapfvis::cli::{InputOpts, handle_sample_command};
use mapfvis::geometry::Point;
use mapfvis::input::{InputError, InputKind, load_scenario};
use mapfvis::map::MapKind;
use mapfvis::scenario::Scenario;
use mapfvis::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

const MAP_3X3: &str = "<root><map>
  <width>3</width><height>3</height>
  <grid><row>0 0 0</row><row>0 0 0</row><row>0 0 0</row></grid>
</map></root>";

const TASK_1_AGENT: &str = r#"<root>
  <agent radius="0.3" start_i="0" start_j="0" goal_i="2" goal_j="2"/>
</root>"#;

/// Write a grid scenario to a temporary directory
fn write_grid_scenario(map: &str, task: &str, solution: &str) -> (TempDir, InputOpts) {
    let dir = tempdir().unwrap();
    let opts = InputOpts {
        kind: MapKind::Grid,
        map: dir.path().join("map.xml"),
        task: dir.path().join("task.xml"),
        solution: dir.path().join("solution.xml"),
    };
    fs::write(&opts.map, map).unwrap();
    fs::write(&opts.task, task).unwrap();
    fs::write(&opts.solution, solution).unwrap();

    (dir, opts)
}

fn load(opts: &InputOpts) -> anyhow::Result<Scenario> {
    load_scenario(opts.kind, &opts.map, &opts.task, &opts.solution)
}

fn assert_position(scenario: &Scenario, t: f64, agent: usize, expected: (f64, f64)) {
    let position = scenario.positions_at(t).unwrap()[agent];
    assert_approx_eq!(f64, position.i, expected.0, epsilon = 1e-9);
    assert_approx_eq!(f64, position.j, expected.1, epsilon = 1e-9);
}

/// An integration test for the `sample` command
#[test]
fn test_handle_sample_command() {
    unsafe { std::env::set_var("MAPFVIS_LOG_LEVEL", "off") };

    let dir = PathBuf::from("demos/grid");
    let opts = InputOpts {
        kind: MapKind::Grid,
        map: dir.join("map.xml"),
        task: dir.join("task.xml"),
        solution: dir.join("solution.xml"),
    };
    let mut out = Vec::new();
    handle_sample_command(&opts, 3.0, &mut out, Some(Settings::default())).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "0: (2.00, 1.00)\n1: (2.00, 4.00)\n"
    );
}

#[test]
fn test_single_section_3x3() {
    let solution = r#"<root><log>
  <summary time="0.001" flowtime="2" makespan="2"/>
  <agent number="0"><path>
    <section number="0" start_i="0" start_j="0" goal_i="2" goal_j="2" duration="2"/>
  </path></agent>
</log></root>"#;
    let (_dir, opts) = write_grid_scenario(MAP_3X3, TASK_1_AGENT, solution);
    let scenario = load(&opts).unwrap();

    assert_position(&scenario, 0.0, 0, (0.0, 0.0));
    assert_position(&scenario, 1.0, 0, (1.0, 1.0));
    assert_position(&scenario, 2.0, 0, (2.0, 2.0));
    assert_position(&scenario, 5.0, 0, (2.0, 2.0));
}

#[test]
fn test_two_sections() {
    let map = "<root><map>
  <width>5</width><height>2</height>
  <grid><row>0 0 0 0 0</row><row>0 0 0 0 0</row></grid>
</map></root>";
    let task = r#"<root><agent radius="0.3" start_i="0" start_j="0" goal_i="1" goal_j="4"/></root>"#;
    let solution = r#"<root><log>
  <summary time="0.001" flowtime="4" makespan="4"/>
  <agent number="0"><path>
    <section number="0" start_i="0" start_j="0" goal_i="1" goal_j="0" duration="1"/>
    <section number="1" start_i="1" start_j="0" goal_i="1" goal_j="4" duration="3"/>
  </path></agent>
</log></root>"#;
    let (_dir, opts) = write_grid_scenario(map, task, solution);
    let scenario = load(&opts).unwrap();

    assert_position(&scenario, 0.5, 0, (0.5, 0.0));
    assert_position(&scenario, 1.0, 0, (1.0, 0.0));
    assert_position(&scenario, 2.5, 0, (1.0, 2.0));
    assert_position(&scenario, 4.0, 0, (1.0, 4.0));
    assert_position(&scenario, 10.0, 0, (1.0, 4.0));
}

#[test]
fn test_section_gap_rejected() {
    let solution = r#"<root><log>
  <summary time="0.001" flowtime="2" makespan="2"/>
  <agent number="0"><path>
    <section number="0" start_i="0" start_j="0" goal_i="1" goal_j="0" duration="1"/>
    <section number="2" start_i="1" start_j="0" goal_i="2" goal_j="2" duration="1"/>
  </path></agent>
</log></root>"#;
    let (_dir, opts) = write_grid_scenario(MAP_3X3, TASK_1_AGENT, solution);
    let err = load(&opts).unwrap_err();

    assert_eq!(
        err.downcast_ref::<InputError>(),
        Some(&InputError::new(InputKind::Solution, &opts.solution))
    );
    assert_eq!(
        err.chain().last().unwrap().to_string(),
        "Section numbers must be contiguous from 0: expected 1, found 2"
    );
}

#[test]
fn test_roadmap_demo() {
    let dir = PathBuf::from("demos/roadmap");
    let scenario = load_scenario(
        MapKind::Roadmap,
        &dir.join("map.xml"),
        &dir.join("task.xml"),
        &dir.join("solution.xml"),
    )
    .unwrap();

    assert_eq!(scenario.num_agents(), 2);
    assert_eq!(
        scenario.start_positions(),
        vec![Some(Point::new(0.0, 0.0)), Some(Point::new(3.0, 6.5))]
    );
    assert_position(&scenario, 2.5, 0, (1.5, 2.0));
    assert_position(&scenario, 6.5, 0, (4.5, 4.0));
    assert_position(&scenario, 3.0, 1, (3.0, 6.5));
    assert_position(&scenario, 100.0, 1, (0.0, 0.0));
}

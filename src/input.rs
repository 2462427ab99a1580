//! Common routines for handling input data.
use crate::map::{Map, MapKind};
use crate::scenario::Scenario;
use anyhow::{Context, Result};
use log::info;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::Display;

pub mod map;
use map::read_map;
pub mod solution;
use solution::read_solution;
pub mod task;
use task::read_task;

/// The different input files that make up a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum InputKind {
    /// The map file
    Map,
    /// The task file
    Task,
    /// The solution file
    Solution,
}

/// Indicates that an input file could not be loaded.
///
/// This is attached as context to the underlying error, so callers can find out which file was at
/// fault with [`anyhow::Error::downcast_ref`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    /// Which file failed to load
    pub kind: InputKind,
    /// Path to the file
    pub file_path: PathBuf,
}

impl InputError {
    /// Create a new `InputError` for the given file
    pub fn new(kind: InputKind, file_path: &Path) -> Self {
        Self {
            kind,
            file_path: file_path.to_path_buf(),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Error reading {} file {}",
            self.kind,
            self.file_path.display()
        )
    }
}

impl Error for InputError {}

/// Read the contents of a text file
fn read_file(file_path: &Path) -> Result<String> {
    fs::read_to_string(file_path)
        .with_context(|| format!("Could not open {}", file_path.display()))
}

/// Read and deserialise a TOML file
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = read_file(file_path)?;
    let toml_data = toml::from_str(&toml_str)
        .with_context(|| format!("Could not parse {}", file_path.display()))?;

    Ok(toml_data)
}

/// Deserialise an XML document into the raw record type `T`
pub fn parse_xml<T: DeserializeOwned>(contents: &str) -> Result<T> {
    quick_xml::de::from_str(contents).context("Malformed XML")
}

/// Parse the value of an XML attribute or element, reporting which field was at fault.
///
/// # Arguments
///
/// * `field` - The name of the field, for error messages
/// * `value` - The raw value, or `None` if the field was missing
pub fn parse_field<T: FromStr>(field: &str, value: Option<&str>) -> Result<T> {
    let value = value.with_context(|| format!("Missing field: {field}"))?;
    value
        .trim()
        .parse()
        .ok()
        .with_context(|| format!("Invalid value for {field}: \"{value}\""))
}

/// Parse a field which must hold a non-negative, finite number
pub fn parse_non_negative(field: &str, value: Option<&str>) -> Result<f64> {
    let parsed: f64 = parse_field(field, value)?;
    anyhow::ensure!(
        parsed.is_finite() && parsed >= 0.0,
        "{field} must be a non-negative number, got {parsed}"
    );

    Ok(parsed)
}

/// Load a scenario (map, task and solution) from the given files.
///
/// All files are fully validated before anything is returned, so a malformed input never results
/// in partial playback.
///
/// # Arguments
///
/// * `kind` - Whether the scenario uses a grid or a roadmap
/// * `map_path` - Path to the map file
/// * `task_path` - Path to the task file
/// * `solution_path` - Path to the solution file
pub fn load_scenario(
    kind: MapKind,
    map_path: &Path,
    task_path: &Path,
    solution_path: &Path,
) -> Result<Scenario> {
    let map = read_map(map_path, kind)?;
    match &map {
        Map::Grid(grid) => info!(
            "Loaded {}x{} grid map with {} obstacles from {}",
            grid.width,
            grid.height,
            grid.num_obstacles(),
            map_path.display()
        ),
        Map::Roadmap(roadmap) => info!(
            "Loaded roadmap with {} nodes and {} edges from {}",
            roadmap.node_count(),
            roadmap.edge_count(),
            map_path.display()
        ),
    }

    let task = read_task(task_path, kind)?;
    task.check_against_map(&map)
        .with_context(|| InputError::new(InputKind::Task, task_path))?;
    info!(
        "Loaded task with {} agents from {}",
        task.num_agents(),
        task_path.display()
    );

    let solution = read_solution(solution_path, &task)?;
    info!(
        "Loaded solution from {} (makespan {}, flowtime {})",
        solution_path.display(),
        solution.makespan,
        solution.flowtime
    );

    Scenario::new(map, task, solution)
        .with_context(|| InputError::new(InputKind::Solution, solution_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        #[serde(rename = "@value")]
        value: Option<String>,
    }

    #[test]
    fn test_parse_xml() {
        let record: Record = parse_xml(r#"<record value="1"/>"#).unwrap();
        assert_eq!(record.value.as_deref(), Some("1"));
        assert!(parse_xml::<Record>("<record").is_err());
    }

    #[rstest]
    #[case(Some("3"), 3)]
    #[case(Some(" 42 "), 42)]
    #[case(Some("-1"), -1)]
    fn test_parse_field(#[case] value: Option<&str>, #[case] expected: i64) {
        assert_eq!(parse_field::<i64>("x", value).unwrap(), expected);
    }

    #[rstest]
    #[case(None, "Missing field: x")]
    #[case(Some("abc"), "Invalid value for x: \"abc\"")]
    #[case(Some("1.5"), "Invalid value for x: \"1.5\"")]
    fn test_parse_field_invalid(#[case] value: Option<&str>, #[case] msg: &str) {
        assert_error!(parse_field::<i64>("x", value), msg);
    }

    #[rstest]
    #[case("0", 0.0)]
    #[case("2", 2.0)]
    #[case("2.5", 2.5)]
    fn test_parse_non_negative(#[case] value: &str, #[case] expected: f64) {
        float_cmp::assert_approx_eq!(
            f64,
            parse_non_negative("duration", Some(value)).unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_non_negative_invalid() {
        assert_error!(
            parse_non_negative("duration", Some("-1")),
            "duration must be a non-negative number, got -1"
        );
        assert_error!(
            parse_non_negative("duration", Some("inf")),
            "duration must be a non-negative number, got inf"
        );
    }

    #[test]
    fn test_input_error_display() {
        let err = InputError::new(InputKind::Solution, Path::new("a/b.xml"));
        assert_eq!(err.to_string(), "Error reading solution file a/b.xml");
    }
}

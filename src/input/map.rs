//! Code for reading grid maps and roadmaps.
use super::*;
use crate::geometry::Point;
use crate::map::{GridMap, Map, Roadmap};
use anyhow::{bail, ensure};
use itertools::Itertools;
use serde::Deserialize;

/// The root of a grid map file
#[derive(Debug, Deserialize)]
struct GridMapFileRaw {
    map: Option<GridMapRaw>,
}

/// The `<map>` element of a grid map file
#[derive(Debug, Deserialize)]
struct GridMapRaw {
    #[serde(rename = "type", default)]
    map_type: String,
    width: Option<String>,
    height: Option<String>,
    grid: Option<GridRaw>,
}

#[derive(Debug, Deserialize)]
struct GridRaw {
    #[serde(rename = "row", default)]
    rows: Vec<String>,
}

/// The root of a GraphML roadmap file
#[derive(Debug, Deserialize)]
struct GraphMlRaw {
    #[serde(rename = "key", default)]
    keys: Vec<KeyRaw>,
    graph: Option<GraphRaw>,
}

/// Declares the name of a data attribute (e.g. `coords`) and the key it is stored under
#[derive(Debug, Deserialize)]
struct KeyRaw {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@for", default)]
    domain: String,
    #[serde(rename = "@attr.name", default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct GraphRaw {
    #[serde(rename = "node", default)]
    nodes: Vec<NodeRaw>,
    #[serde(rename = "edge", default)]
    edges: Vec<EdgeRaw>,
}

#[derive(Debug, Deserialize)]
struct NodeRaw {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "data", default)]
    data: Vec<DataRaw>,
}

#[derive(Debug, Deserialize)]
struct EdgeRaw {
    #[serde(rename = "@source")]
    source: String,
    #[serde(rename = "@target")]
    target: String,
    #[serde(rename = "data", default)]
    data: Vec<DataRaw>,
}

#[derive(Debug, Deserialize)]
struct DataRaw {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$text", default)]
    value: String,
}

/// Read a map of the given kind from a file
pub fn read_map(file_path: &Path, kind: MapKind) -> Result<Map> {
    read_file(file_path)
        .and_then(|contents| read_map_from_str(&contents, kind))
        .with_context(|| InputError::new(InputKind::Map, file_path))
}

fn read_map_from_str(contents: &str, kind: MapKind) -> Result<Map> {
    Ok(match kind {
        MapKind::Grid => Map::Grid(read_grid_map_from_str(contents)?),
        MapKind::Roadmap => Map::Roadmap(read_roadmap_from_str(contents)?),
    })
}

/// Parse a grid map from the contents of an XML file
fn read_grid_map_from_str(contents: &str) -> Result<GridMap> {
    let raw: GridMapFileRaw = parse_xml(contents)?;
    let map = raw.map.context("Missing <map> element")?;
    let width = parse_field("width", map.width.as_deref())?;
    let height = parse_field("height", map.height.as_deref())?;
    let grid = map.grid.context("Missing <grid> element")?;

    let rows = grid
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_grid_row(row).with_context(|| format!("Invalid grid row {i}")))
        .try_collect()?;

    GridMap::new(map.map_type, width, height, rows)
}

/// Parse a row of space-separated 0/1 cells, where 1 marks an obstacle
fn parse_grid_row(row: &str) -> Result<Vec<bool>> {
    row.split_whitespace()
        .map(|cell| match cell {
            "0" => Ok(false),
            "1" => Ok(true),
            other => bail!("Cell value must be 0 or 1, got \"{other}\""),
        })
        .try_collect()
}

/// Find the key under which data with the given attribute name is stored
fn find_key<'a>(keys: &'a [KeyRaw], domain: &str, name: &str) -> Option<&'a str> {
    keys.iter()
        .find(|key| key.name == name && (key.domain == domain || key.domain == "all"))
        .map(|key| key.id.as_str())
}

fn find_data<'a>(data: &'a [DataRaw], key: Option<&str>) -> Option<&'a str> {
    let key = key?;
    data.iter()
        .find(|datum| datum.key == key)
        .map(|datum| datum.value.as_str())
}

/// Parse a coordinate pair of the form "x,y"
fn parse_coords(value: &str) -> Result<Point> {
    let Some((i, j)) = value.split(',').collect_tuple() else {
        bail!("Coordinates must be a pair of numbers separated by a comma, got \"{value}\"");
    };

    Ok(Point::new(
        parse_field("coords", Some(i))?,
        parse_field("coords", Some(j))?,
    ))
}

/// Parse a roadmap from the contents of a GraphML file
fn read_roadmap_from_str(contents: &str) -> Result<Roadmap> {
    let raw: GraphMlRaw = parse_xml(contents)?;
    let graph = raw.graph.context("Missing <graph> element")?;
    let coords_key = find_key(&raw.keys, "node", "coords");
    ensure!(coords_key.is_some(), "No \"coords\" attribute declared for nodes");
    let weight_key = find_key(&raw.keys, "edge", "weight");

    let mut roadmap = Roadmap::default();
    for node in &graph.nodes {
        let coords = find_data(&node.data, coords_key)
            .with_context(|| format!("Node {} has no coords", node.id))
            .and_then(parse_coords)
            .with_context(|| format!("Invalid node {}", node.id))?;
        roadmap.add_node(&node.id, coords)?;
    }

    for edge in &graph.edges {
        find_data(&edge.data, weight_key)
            .map(|value| parse_non_negative("weight", Some(value)))
            .transpose()
            .and_then(|weight| roadmap.add_edge(&edge.source, &edge.target, weight))
            .with_context(|| format!("Invalid edge {} -> {}", edge.source, edge.target))?;
    }

    ensure!(roadmap.node_count() > 0, "Roadmap has no nodes");

    Ok(roadmap)
}

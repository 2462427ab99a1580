//! The map on which agents move: either an occupancy grid or a roadmap graph.
use crate::geometry::Point;
use anyhow::{Context, Result, ensure};
use clap::ValueEnum;
use indexmap::IndexMap;
use petgraph::graph::{NodeIndex, UnGraph};
use strum::Display;

/// The kind of map a scenario is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum MapKind {
    /// A 4-connected grid of cells
    Grid,
    /// A graph of nodes with 2D coordinates
    Roadmap,
}

/// A loaded map
#[derive(Debug, Clone)]
pub enum Map {
    /// An occupancy grid
    Grid(GridMap),
    /// A roadmap graph
    Roadmap(Roadmap),
}

impl Map {
    /// The kind of this map
    pub fn kind(&self) -> MapKind {
        match self {
            Map::Grid(_) => MapKind::Grid,
            Map::Roadmap(_) => MapKind::Roadmap,
        }
    }
}

/// An occupancy grid, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    /// The free-form map type label from the file (e.g. "octile")
    pub map_type: String,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    cells: Vec<bool>,
}

impl GridMap {
    /// Create a grid from its rows, where `true` marks a blocked cell.
    ///
    /// Fails if the number of rows or the length of any row doesn't match the declared size.
    pub fn new(map_type: String, width: usize, height: usize, rows: Vec<Vec<bool>>) -> Result<Self> {
        ensure!(
            rows.len() == height,
            "Map height is {height} but the grid has {} rows",
            rows.len()
        );

        // No reservation: width and height are untrusted until every row has been checked
        let mut cells = Vec::new();
        for (i, row) in rows.into_iter().enumerate() {
            ensure!(
                row.len() == width,
                "Row {i} has {} cells, but map width is {width}",
                row.len()
            );
            cells.extend(row);
        }

        Ok(Self {
            map_type,
            width,
            height,
            cells,
        })
    }

    /// Whether the cell `(i, j)` lies on the map
    pub fn contains(&self, i: i64, j: i64) -> bool {
        usize::try_from(i).is_ok_and(|i| i < self.height)
            && usize::try_from(j).is_ok_and(|j| j < self.width)
    }

    /// Whether the cell `(i, j)` is an obstacle. Cells off the map count as blocked.
    pub fn is_blocked(&self, i: i64, j: i64) -> bool {
        let (Ok(i), Ok(j)) = (usize::try_from(i), usize::try_from(j)) else {
            return true;
        };
        if i >= self.height || j >= self.width {
            return true;
        }

        self.cells[i * self.width + j]
    }

    /// Number of blocked cells
    pub fn num_obstacles(&self) -> usize {
        self.cells.iter().filter(|blocked| **blocked).count()
    }
}

/// A node of a roadmap
#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapNode {
    /// The node's identifier in the map file (e.g. "n3")
    pub id: String,
    /// The node's position
    pub coords: Point,
}

/// A roadmap: an undirected graph of positioned nodes with weighted edges
#[derive(Debug, Clone, Default)]
pub struct Roadmap {
    graph: UnGraph<RoadmapNode, f64>,
    node_indices: IndexMap<String, NodeIndex>,
}

impl Roadmap {
    /// Add a node. Fails if a node with the same ID already exists.
    pub fn add_node(&mut self, id: &str, coords: Point) -> Result<()> {
        ensure!(
            !self.node_indices.contains_key(id),
            "Duplicate node ID: {id}"
        );

        let index = self.graph.add_node(RoadmapNode {
            id: id.to_string(),
            coords,
        });
        self.node_indices.insert(id.to_string(), index);

        Ok(())
    }

    /// Add an edge between two existing nodes.
    ///
    /// If no weight is given, the Euclidean distance between the nodes is used.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: Option<f64>) -> Result<()> {
        let source_idx = self.node_index(source)?;
        let target_idx = self.node_index(target)?;
        let weight = weight.unwrap_or_else(|| {
            self.graph[source_idx]
                .coords
                .dist_to(self.graph[target_idx].coords)
        });
        self.graph.add_edge(source_idx, target_idx, weight);

        Ok(())
    }

    fn node_index(&self, id: &str) -> Result<NodeIndex> {
        self.node_indices
            .get(id)
            .copied()
            .with_context(|| format!("Unknown node ID: {id}"))
    }

    /// Get the coordinates of the node with the given ID
    pub fn coords_of(&self, id: &str) -> Option<Point> {
        let index = self.node_indices.get(id)?;
        Some(self.graph[*index].coords)
    }

    /// Get the coordinates of the node referred to by a task's numeric node ID
    pub fn coords_of_task_node(&self, node: u32) -> Option<Point> {
        self.coords_of(&task_node_id(node))
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The weight of the edge between two nodes, if there is one
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<f64> {
        let source_idx = self.node_index(source).ok()?;
        let target_idx = self.node_index(target).ok()?;
        let edge = self.graph.find_edge(source_idx, target_idx)?;
        self.graph.edge_weight(edge).copied()
    }
}

/// The roadmap node ID a task's numeric node refers to
pub fn task_node_id(node: u32) -> String {
    format!("n{node}")
}

//! Maze graph: an arena of nodes with two symmetric adjacency layers.
//!
//! Nodes are addressed by [`NodeId`] handles into the arena. Identifiers are
//! labels only; the arena is kept sorted by identifier so that graphs built
//! from the same topology line up handle-for-handle.
//!
//! Composition (`compose`), segmentation (`segment`), transforms and metrics
//! live in sibling files as further `impl MazeGraph` blocks.

mod compose;
mod metrics;
mod node;
mod segment;
mod transform;
mod traversal;

pub use node::{MazeNode, NodeId};
pub(crate) use node::{link_base, link_connected, unlink_base};

use crate::error::{MazeError, Result};
use crate::geom::Float3;
use rand::Rng;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct MazeGraph {
    nodes: Vec<MazeNode>,
    start: NodeId,
    end: NodeId,
    scale: Float3,
    path_lengths: BTreeMap<u32, usize>,
    min_path_length: usize,
    max_path_length: usize,
    quadrants: Vec<Vec<NodeId>>,
    path_segments: Option<Vec<Vec<NodeId>>>,
}

impl MazeGraph {
    /// Builds a graph from topology output.
    ///
    /// Start and end are the nodes named `"start"` and `"end"`; a missing one
    /// is drawn from `rng` among the remaining nodes.
    pub fn new<R: Rng + ?Sized>(
        nodes: Vec<MazeNode>,
        scale: Float3,
        min_path_length: usize,
        max_path_length: usize,
        quadrants: Vec<Vec<NodeId>>,
        rng: &mut R,
    ) -> Result<Self> {
        if nodes.len() < 2 {
            return Err(MazeError::TooFewNodes(nodes.len()));
        }
        let named = |name: &str| nodes.iter().position(|n| n.identifier == name).map(NodeId);
        let mut start = named("start");
        let mut end = named("end");

        if start.is_none() {
            start = Some(pick_other(nodes.len(), end, rng));
        }
        if end.is_none() {
            end = Some(pick_other(nodes.len(), start, rng));
        }
        let (Some(start), Some(end)) = (start, end) else {
            return Err(MazeError::MissingTerminal("start"));
        };

        let mut graph = MazeGraph {
            nodes,
            start,
            end,
            scale,
            path_lengths: BTreeMap::new(),
            min_path_length,
            max_path_length,
            quadrants,
            path_segments: None,
        };
        graph.resort();
        Ok(graph)
    }

    /// Restores identifier order after nodes were added or renamed.
    pub(crate) fn resort(&mut self) {
        let remap = node::sort_by_identifier(&mut self.nodes);
        let map = |id: &mut NodeId| *id = remap[id.0];

        map(&mut self.start);
        map(&mut self.end);
        self.quadrants.iter_mut().flatten().for_each(map);
        if let Some(segments) = self.path_segments.as_mut() {
            segments.iter_mut().flatten().for_each(map);
        }
    }

    // --- Node access ---

    pub fn nodes(&self) -> &[MazeNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &MazeNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut MazeNode {
        &mut self.nodes[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Linear lookup by identifier, meant for tests and diagnostics.
    pub fn find(&self, identifier: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.identifier == identifier)
            .map(NodeId)
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn start_node(&self) -> &MazeNode {
        self.node(self.start)
    }

    pub fn end_node(&self) -> &MazeNode {
        self.node(self.end)
    }

    pub fn position(&self, id: NodeId) -> Float3 {
        self.nodes[id.0].position
    }

    /// Mean node position.
    pub fn center(&self) -> Float3 {
        if self.nodes.is_empty() {
            return Float3::ZERO;
        }
        let sum = self
            .nodes
            .iter()
            .fold(Float3::ZERO, |acc, n| acc + n.position);
        sum / self.nodes.len() as f32
    }

    // --- Graph-level bookkeeping ---

    pub fn scale(&self) -> Float3 {
        self.scale
    }

    pub fn min_path_length(&self) -> usize {
        self.min_path_length
    }

    pub fn max_path_length(&self) -> usize {
        self.max_path_length
    }

    pub fn path_lengths(&self) -> &BTreeMap<u32, usize> {
        &self.path_lengths
    }

    /// Shortest-path indices carried by this graph, ascending.
    pub fn path_indices(&self) -> Vec<u32> {
        self.path_lengths.keys().copied().collect()
    }

    pub(crate) fn set_path_length(&mut self, index: u32, length: usize) {
        self.path_lengths.insert(index, length);
    }

    /// Lowest index not yet used by any shortest path.
    pub fn next_path_index(&self) -> u32 {
        (0..)
            .find(|i| !self.path_lengths.contains_key(i))
            .unwrap_or_default()
    }

    pub fn quadrants(&self) -> &[Vec<NodeId>] {
        &self.quadrants
    }

    pub fn path_segments(&self) -> Option<&[Vec<NodeId>]> {
        self.path_segments.as_deref()
    }

    // --- Connections ---

    /// Carves a connection between two nodes that the topology allows to link.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        if a == b {
            return Err(MazeError::SelfConnection(self.nodes[a.0].identifier.clone()));
        }
        let allowed = self.nodes[a.0].all_neighbors.contains(&b)
            && self.nodes[b.0].all_neighbors.contains(&a);
        if !allowed {
            return Err(MazeError::NotNeighbors {
                a: self.nodes[a.0].identifier.clone(),
                b: self.nodes[b.0].identifier.clone(),
            });
        }
        link_connected(&mut self.nodes, a, b);
        Ok(())
    }

    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        if a == b {
            return Err(MazeError::SelfConnection(self.nodes[a.0].identifier.clone()));
        }
        node::unlink_connected(&mut self.nodes, a, b);
        Ok(())
    }

    pub fn add_base_connection(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        if a == b {
            return Err(MazeError::SelfConnection(self.nodes[a.0].identifier.clone()));
        }
        link_base(&mut self.nodes, a, b);
        Ok(())
    }

    pub fn remove_base_connection(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        if a == b {
            return Err(MazeError::SelfConnection(self.nodes[a.0].identifier.clone()));
        }
        unlink_base(&mut self.nodes, a, b);
        Ok(())
    }

    /// Drops every carved connection, label and path bookkeeping entry.
    pub fn clear_maze(&mut self) {
        for node in &mut self.nodes {
            node.connected_neighbors.clear();
            node.clear_labels();
        }
        self.path_lengths.clear();
        self.path_segments = None;
    }

    /// Removes all connections of nodes that are not on any shortest path.
    pub fn keep_only_shortest_path_connections(&mut self) {
        let off_path: Vec<NodeId> = self
            .ids()
            .filter(|&id| !self.nodes[id.0].on_shortest_path())
            .collect();
        for id in off_path {
            let neighbors = self.nodes[id.0].connected_neighbors.clone();
            for nb in neighbors {
                node::unlink_connected(&mut self.nodes, id, nb);
            }
            let node = &mut self.nodes[id.0];
            node.on_dead_end = false;
            node.on_loop = false;
            node.not_connected_to_path = true;
        }
    }

    // --- Quadrants ---

    /// Activates the nodes of one quadrant and deactivates all others.
    pub fn set_active_quadrant(&mut self, index: usize) -> Result<()> {
        let quadrant = self
            .quadrants
            .get(index)
            .ok_or(MazeError::QuadrantOutOfRange {
                index,
                count: self.quadrants.len(),
            })?;
        for node in &mut self.nodes {
            node.active = false;
        }
        for id in quadrant {
            self.nodes[id.0].active = true;
        }
        Ok(())
    }

    pub fn activate_all_nodes(&mut self) {
        for node in &mut self.nodes {
            node.active = true;
        }
    }
}

fn pick_other<R: Rng + ?Sized>(count: usize, exclude: Option<NodeId>, rng: &mut R) -> NodeId {
    let candidates: Vec<usize> = (0..count).filter(|&i| Some(NodeId(i)) != exclude).collect();
    NodeId(candidates[rng.gen_range(0..candidates.len())])
}

//! Maze carving and path labeling.
//!
//! [`MazeGenerator`] ties a [`Topology`] to a seeded random generator: it
//! builds empty graphs, carves a spanning maze over their active nodes and
//! labels the shortest path and the branches hanging off it. The same seed
//! always reproduces the same maze.

mod backtrack;
mod hunt;
mod label;

pub use label::label_shortest_path;

use crate::config::{CarveAlgorithm, MazeConfig};
use crate::error::{MazeError, Result};
use crate::graph::{MazeGraph, NodeId};
use crate::topology::Topology;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds and carves mazes over one topology.
#[derive(Debug, Clone)]
pub struct MazeGenerator<T: Topology> {
    topology: T,
    config: MazeConfig,
    rng: StdRng,
}

impl<T: Topology> MazeGenerator<T> {
    pub fn new(topology: T, config: MazeConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            topology,
            config,
        }
    }

    pub fn topology(&self) -> &T {
        &self.topology
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Restarts the random sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Builds the topology with every link possible and nothing carved.
    pub fn empty_graph(&mut self) -> Result<MazeGraph> {
        self.topology.build(&self.config, &mut self.rng)
    }

    /// Builds, carves and labels a fresh maze.
    pub fn generate(&mut self) -> Result<MazeGraph> {
        let mut graph = self.empty_graph()?;
        self.carve_and_label(&mut graph)?;
        Ok(graph)
    }

    /// Carves the active nodes of `graph` and labels the new shortest path.
    /// Returns the path index it was recorded under.
    pub fn carve_and_label(&mut self, graph: &mut MazeGraph) -> Result<u32> {
        carve(graph, self.config.carve, &mut self.rng)?;
        label_shortest_path(graph)
    }

    /// Carves and labels within one quadrant, then reactivates every node.
    pub fn generate_in_quadrant(&mut self, graph: &mut MazeGraph, quadrant: usize) -> Result<u32> {
        graph.set_active_quadrant(quadrant)?;
        let index = self.carve_and_label(graph);
        graph.activate_all_nodes();
        index
    }

    /// Topology and scale, identifying mazes that share a seed catalog.
    pub fn descriptor(&self) -> String {
        let s = self.config.scale;
        format!("{}-{}x{}x{}", self.topology.descriptor(), s.x, s.y, s.z)
    }
}

/// Carves a spanning tree over the active nodes with the chosen algorithm.
pub fn carve<R: Rng + ?Sized>(
    graph: &mut MazeGraph,
    algorithm: CarveAlgorithm,
    rng: &mut R,
) -> Result<()> {
    match algorithm {
        CarveAlgorithm::RecursiveBacktracking => backtrack::recursive_backtracking(graph, rng)?,
        CarveAlgorithm::HuntAndKill {
            hunt_after_segment_length,
            hunt_probability,
        } => hunt::hunt_and_kill(graph, hunt_after_segment_length, hunt_probability, rng)?,
    }
    debug!(
        "carved {} connections over {} nodes",
        graph.number_of_connections(),
        graph.node_count()
    );
    Ok(())
}

fn require_active_terminals(graph: &MazeGraph) -> Result<()> {
    if graph.start_node().active && graph.end_node().active {
        Ok(())
    } else {
        Err(MazeError::InactiveTerminal)
    }
}

/// Visit flags before carving: inactive and isolated nodes count as visited.
fn initial_visits(graph: &MazeGraph) -> Vec<bool> {
    graph
        .nodes()
        .iter()
        .map(|n| !n.active || n.all_neighbors().is_empty())
        .collect()
}

fn unvisited_neighbors(graph: &MazeGraph, id: NodeId, visited: &[bool]) -> Vec<NodeId> {
    graph
        .node(id)
        .all_neighbors()
        .iter()
        .copied()
        .filter(|nb| !visited[nb.0])
        .collect()
}

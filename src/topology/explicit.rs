use super::{jitter_offset, Topology};
use crate::config::MazeConfig;
use crate::error::{MazeError, Result};
use crate::geom::Float3;
use crate::graph::{link_base, MazeGraph, MazeNode, NodeId};
use rand::Rng;

/// Caller-assembled node set.
///
/// Positions are in scale units. Nodes named `start` and `end` become the
/// terminals; missing ones are drawn from the builder's random generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplicitTopology {
    nodes: Vec<(String, Float3)>,
    links: Vec<(usize, usize)>,
}

impl ExplicitTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its index for [`ExplicitTopology::add_link`].
    pub fn add_node(&mut self, identifier: impl Into<String>, position: Float3) -> usize {
        self.nodes.push((identifier.into(), position));
        self.nodes.len() - 1
    }

    pub fn add_link(&mut self, a: usize, b: usize) -> Result<()> {
        let name = |i: usize| {
            self.nodes
                .get(i)
                .map(|(id, _)| id.clone())
                .unwrap_or_else(|| format!("#{i}"))
        };
        if a == b {
            return Err(MazeError::SelfConnection(name(a)));
        }
        if a >= self.nodes.len() || b >= self.nodes.len() {
            return Err(MazeError::NotNeighbors { a: name(a), b: name(b) });
        }
        self.links.push((a, b));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Topology for ExplicitTopology {
    fn build<R: Rng + ?Sized>(&self, config: &MazeConfig, rng: &mut R) -> Result<MazeGraph> {
        let mut nodes: Vec<MazeNode> = self
            .nodes
            .iter()
            .map(|(identifier, position)| {
                let position =
                    position.scale(config.scale) + jitter_offset(config.scale, config.jitter, rng);
                MazeNode::new(position, identifier.clone())
            })
            .collect();
        for &(a, b) in &self.links {
            link_base(&mut nodes, NodeId(a), NodeId(b));
        }
        let count = nodes.len();
        MazeGraph::new(nodes, config.scale, 1, count, Vec::new(), rng)
    }

    fn descriptor(&self) -> String {
        format!("Explicit-{}", self.nodes.len())
    }
}

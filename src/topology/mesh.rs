use super::{jitter_offset, Topology};
use crate::config::MazeConfig;
use crate::error::{MazeError, Result};
use crate::geom::Float3;
use crate::graph::{link_base, MazeGraph, MazeNode, NodeId};
use log::debug;
use rand::Rng;
use std::collections::HashMap;

/// Maze over the vertices and triangle edges of an arbitrary mesh.
///
/// Vertices that print to the same position are merged. The mesh is centred
/// on its mean vertex and rescaled so the mean spacing between linked
/// vertices equals the configured scale. Start and end are the lowest and
/// highest vertices along z.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshTopology {
    pub vertices: Vec<Float3>,
    pub triangles: Vec<[usize; 3]>,
}

impl MeshTopology {
    pub fn new(vertices: Vec<Float3>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }
}

impl Topology for MeshTopology {
    fn build<R: Rng + ?Sized>(&self, config: &MazeConfig, rng: &mut R) -> Result<MazeGraph> {
        let mesh = mesh_nodes(&self.vertices, &self.triangles, config, rng)?;
        let count = mesh.nodes.len();
        MazeGraph::new(mesh.nodes, config.scale, 1, count, Vec::new(), rng)
    }

    fn descriptor(&self) -> String {
        format!("Mesh-{}v{}t", self.vertices.len(), self.triangles.len())
    }
}

/// Linked, scaled and jittered mesh nodes before graph construction.
pub(crate) struct MeshNodes {
    pub nodes: Vec<MazeNode>,
    pub start: NodeId,
    pub end: NodeId,
}

fn position_key(p: Float3) -> String {
    // Rounded first so that -0.00001 and 0.00001 share a key.
    let r = |v: f32| {
        let v = (v * 1e4).round() / 1e4;
        if v == 0.0 {
            0.0
        } else {
            v
        }
    };
    format!("({:.4}, {:.4}, {:.4})", r(p.x), r(p.y), r(p.z))
}

pub(crate) fn mesh_nodes<R: Rng + ?Sized>(
    vertices: &[Float3],
    triangles: &[[usize; 3]],
    config: &MazeConfig,
    rng: &mut R,
) -> Result<MeshNodes> {
    if vertices.is_empty() || triangles.is_empty() {
        return Err(MazeError::InvalidMesh("mesh has no triangles".into()));
    }

    let mut keys: HashMap<String, usize> = HashMap::new();
    let mut nodes: Vec<MazeNode> = Vec::new();
    let mut unique = Vec::with_capacity(vertices.len());
    for &vertex in vertices {
        let key = position_key(vertex);
        let id = *keys.entry(key.clone()).or_insert_with(|| {
            nodes.push(MazeNode::new(vertex, key));
            nodes.len() - 1
        });
        unique.push(id);
    }

    for triangle in triangles {
        if let Some(&bad) = triangle.iter().find(|&&i| i >= vertices.len()) {
            return Err(MazeError::InvalidMesh(format!(
                "triangle index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }
        let [a, b, c] = triangle.map(|i| NodeId(unique[i]));
        link_base(&mut nodes, a, b);
        link_base(&mut nodes, a, c);
        link_base(&mut nodes, b, c);
    }

    let center = nodes
        .iter()
        .fold(Float3::ZERO, |acc, n| acc + n.position)
        / nodes.len() as f32;
    for node in &mut nodes {
        node.position = node.position - center;
    }

    let spacing = mean_spacing(&nodes);
    if spacing <= f32::EPSILON {
        return Err(MazeError::InvalidMesh("vertices have no spacing".into()));
    }

    // Terminals come from the unjittered shape.
    let mut start = 0;
    let mut end = 0;
    for (i, node) in nodes.iter().enumerate() {
        if node.position.z < nodes[start].position.z {
            start = i;
        }
        if node.position.z > nodes[end].position.z {
            end = i;
        }
    }
    if start == end {
        return Err(MazeError::InvalidMesh("mesh has no extent along z".into()));
    }

    for node in &mut nodes {
        node.position = (node.position / spacing).scale(config.scale)
            + jitter_offset(config.scale, config.jitter, rng);
    }
    nodes[start].identifier = "start".into();
    nodes[end].identifier = "end".into();

    debug!(
        "built mesh with {} unique vertices from {}",
        nodes.len(),
        vertices.len()
    );
    Ok(MeshNodes {
        nodes,
        start: NodeId(start),
        end: NodeId(end),
    })
}

/// Mean over nodes of each node's mean distance to its linked neighbours.
fn mean_spacing(nodes: &[MazeNode]) -> f32 {
    let per_node: Vec<f32> = nodes
        .iter()
        .filter(|n| !n.all_neighbors.is_empty())
        .map(|n| {
            let total: f32 = n
                .all_neighbors
                .iter()
                .map(|nb| n.position.distance(nodes[nb.0].position))
                .sum();
            total / n.all_neighbors.len() as f32
        })
        .collect();
    if per_node.is_empty() {
        return 0.0;
    }
    per_node.iter().sum::<f32>() / per_node.len() as f32
}

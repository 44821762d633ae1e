use super::mesh::mesh_nodes;
use super::quadrant::insert_fences;
use super::Topology;
use crate::config::MazeConfig;
use crate::error::{MazeError, Result};
use crate::geom::Float3;
use crate::graph::MazeGraph;
use rand::Rng;
use std::collections::HashMap;
use std::f32::consts::PI;

/// Fraction of the smallest scale component used as fence tolerance when no
/// explicit epsilon is given.
const DEFAULT_FENCE_FRACTION: f32 = 0.05;

/// Subdivided icosahedron with its poles on the z axis, optionally fenced
/// into 2 or 4 quadrants around the poles.
#[derive(Debug, Clone, PartialEq)]
pub struct IcosphereTopology {
    pub divisions: usize,
    /// 0 for an unsplit sphere, else 2 or 4.
    pub quadrants: usize,
    /// Distance from a quadrant boundary within which nodes are fenced.
    pub fence_epsilon: Option<f32>,
}

impl IcosphereTopology {
    pub fn new(divisions: usize) -> Self {
        Self {
            divisions,
            quadrants: 0,
            fence_epsilon: None,
        }
    }

    pub fn with_quadrants(mut self, quadrants: usize) -> Self {
        self.quadrants = quadrants;
        self
    }

    pub fn with_fence_epsilon(mut self, epsilon: f32) -> Self {
        self.fence_epsilon = Some(epsilon);
        self
    }
}

impl Topology for IcosphereTopology {
    fn build<R: Rng + ?Sized>(&self, config: &MazeConfig, rng: &mut R) -> Result<MazeGraph> {
        if !matches!(self.quadrants, 0 | 2 | 4) {
            return Err(MazeError::UnsupportedQuadrantCount(self.quadrants));
        }
        let (vertices, triangles) = icosphere(self.divisions);
        let mesh = mesh_nodes(&vertices, &triangles, config, rng)?;
        let mut nodes = mesh.nodes;

        let quadrants = if self.quadrants == 0 {
            Vec::new()
        } else {
            let epsilon = self
                .fence_epsilon
                .unwrap_or(DEFAULT_FENCE_FRACTION * config.scale.component_min());
            let (_, _, quadrants) =
                insert_fences(&mut nodes, mesh.start, mesh.end, self.quadrants, epsilon)?;
            quadrants
        };

        let count = nodes.len();
        MazeGraph::new(
            nodes,
            config.scale,
            self.divisions * 5 + 1,
            count,
            quadrants,
            rng,
        )
    }

    fn descriptor(&self) -> String {
        format!("Icosphere-{}", self.divisions)
    }
}

/// Unit-sphere vertices and triangles of an icosahedron subdivided
/// `divisions` times.
pub(crate) fn icosphere(divisions: usize) -> (Vec<Float3>, Vec<[usize; 3]>) {
    let ring_z = 1.0 / 5f32.sqrt();
    let ring_r = 2.0 / 5f32.sqrt();
    let ring = |degrees: f32, z: f32| {
        let a = degrees * PI / 180.0;
        Float3::new(ring_r * a.cos(), ring_r * a.sin(), z)
    };

    let mut vertices = vec![Float3::FORWARD];
    vertices.extend((0..5).map(|k| ring(72.0 * k as f32, ring_z)));
    vertices.extend((0..5).map(|k| ring(72.0 * k as f32 + 36.0, -ring_z)));
    vertices.push(Float3::BACK);

    let top = 0;
    let bottom = 11;
    let upper = |k: usize| 1 + k % 5;
    let lower = |k: usize| 6 + k % 5;
    let mut triangles = Vec::with_capacity(20);
    for k in 0..5 {
        triangles.push([top, upper(k), upper(k + 1)]);
        triangles.push([upper(k), lower(k), upper(k + 1)]);
        triangles.push([upper(k + 1), lower(k), lower(k + 1)]);
        triangles.push([bottom, lower(k + 1), lower(k)]);
    }

    for _ in 0..divisions {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut midpoint = |a: usize, b: usize, vertices: &mut Vec<Float3>| {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let middle = ((vertices[a] + vertices[b]) / 2.0).normalize();
                vertices.push(middle);
                vertices.len() - 1
            })
        };

        let mut next = Vec::with_capacity(triangles.len() * 4);
        for [a, b, c] in triangles {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        triangles = next;
    }
    (vertices, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn build(sphere: &IcosphereTopology) -> MazeGraph {
        let config = MazeConfig::new(Float3::splat(2.0), 0);
        sphere.build(&config, &mut StdRng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn test_vertex_counts() {
        for (divisions, expected) in [(0, 12), (1, 42), (2, 162)] {
            let (vertices, triangles) = icosphere(divisions);
            assert_eq!(vertices.len(), expected);
            assert_eq!(triangles.len(), 20 * 4usize.pow(divisions as u32));
            for v in &vertices {
                assert_relative_eq!(v.magnitude(), 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_unsplit_sphere() {
        let graph = build(&IcosphereTopology::new(2));
        assert_eq!(graph.node_count(), 162);
        assert_eq!(graph.min_path_length(), 11);
        assert_eq!(graph.max_path_length(), 162);
        assert!(graph.quadrants().is_empty());
        assert!(graph.is_consistent());
        for node in graph.nodes() {
            let degree = node.all_neighbors().len();
            assert!(degree == 5 || degree == 6);
        }
        // Poles are the z extremes.
        assert!(graph.start_node().position.z < 0.0);
        assert!(graph.start_node().position.x.abs() < 1e-4);
        assert!(graph.end_node().position.z > 0.0);
    }

    fn shared(graph: &MazeGraph, a: usize, b: usize) -> BTreeSet<NodeId> {
        let qa: BTreeSet<NodeId> = graph.quadrants()[a].iter().copied().collect();
        graph.quadrants()[b]
            .iter()
            .copied()
            .filter(|id| qa.contains(id))
            .collect()
    }

    #[test]
    fn test_two_quadrants_share_only_terminals() {
        let graph = build(&IcosphereTopology::new(2).with_quadrants(2));
        assert_eq!(graph.quadrants().len(), 2);
        let terminals: BTreeSet<NodeId> = [graph.start(), graph.end()].into_iter().collect();
        assert_eq!(shared(&graph, 0, 1), terminals);

        let covered: BTreeSet<NodeId> = graph.quadrants().iter().flatten().copied().collect();
        assert_eq!(covered.len(), graph.node_count());
        assert!(graph.node_count() > 162);
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_four_quadrants_share_only_terminals() {
        let graph = build(&IcosphereTopology::new(2).with_quadrants(4));
        let terminals: BTreeSet<NodeId> = [graph.start(), graph.end()].into_iter().collect();
        assert_eq!(graph.quadrants().len(), 4);
        for a in 0..4 {
            for b in a + 1..4 {
                assert_eq!(shared(&graph, a, b), terminals);
            }
        }
    }

    #[test]
    fn test_rejects_odd_quadrant_counts() {
        let mut rng = StdRng::seed_from_u64(0);
        for count in [1, 3, 8] {
            let sphere = IcosphereTopology::new(1).with_quadrants(count);
            assert!(matches!(
                sphere.build(&MazeConfig::default(), &mut rng),
                Err(MazeError::UnsupportedQuadrantCount(c)) if c == count
            ));
        }
    }
}

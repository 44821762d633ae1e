use super::{jitter_offset, Topology};
use crate::config::MazeConfig;
use crate::error::{MazeError, Result};
use crate::geom::Float3;
use crate::graph::{link_base, MazeGraph, MazeNode, NodeId};
use log::debug;
use rand::Rng;

const AXIS_OFFSETS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Rectangular lattice of `x * y * z` nodes.
///
/// Even extents are bumped to the next odd number so the start and end nodes
/// sit on a centre column. Start is the centre node of the first z layer,
/// end the centre node of the last.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTopology {
    pub size: [usize; 3],
    /// Also link the diagonal neighbours that step along x.
    pub allow_slanted: bool,
}

impl GridTopology {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self {
            size: [x, y, z],
            allow_slanted: false,
        }
    }

    pub fn with_slanted(mut self, allow: bool) -> Self {
        self.allow_slanted = allow;
        self
    }

    /// Extents after rounding up to odd numbers.
    pub fn dimensions(&self) -> [usize; 3] {
        self.size.map(|s| if s % 2 == 0 { s + 1 } else { s })
    }

    fn offsets(&self) -> Vec<[i64; 3]> {
        let mut offsets = AXIS_OFFSETS.to_vec();
        if self.allow_slanted {
            for dx in [-1, 1] {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        if dy != 0 || dz != 0 {
                            offsets.push([dx, dy, dz]);
                        }
                    }
                }
            }
        }
        offsets
    }
}

fn identifier(ix: usize, iy: usize, iz: usize) -> String {
    format!(".{ix}.{iy}.{iz}")
}

impl Topology for GridTopology {
    fn build<R: Rng + ?Sized>(&self, config: &MazeConfig, rng: &mut R) -> Result<MazeGraph> {
        if self.size.contains(&0) {
            return Err(MazeError::InvalidGridSize(self.size));
        }
        let [sx, sy, sz] = self.dimensions();
        if sz < 2 {
            return Err(MazeError::InvalidGridSize(self.size));
        }
        let index = |ix: usize, iy: usize, iz: usize| (ix * sy + iy) * sz + iz;

        let mut nodes = Vec::with_capacity(sx * sy * sz);
        for ix in 0..sx {
            for iy in 0..sy {
                for iz in 0..sz {
                    let lattice = Float3::new(ix as f32, iy as f32, iz as f32);
                    let position = lattice.scale(config.scale)
                        + jitter_offset(config.scale, config.jitter, rng);
                    nodes.push(MazeNode::new(position, identifier(ix, iy, iz)));
                }
            }
        }

        let offsets = self.offsets();
        let bounds = [sx as i64, sy as i64, sz as i64];
        for ix in 0..sx {
            for iy in 0..sy {
                for iz in 0..sz {
                    for [dx, dy, dz] in &offsets {
                        let n = [ix as i64 + dx, iy as i64 + dy, iz as i64 + dz];
                        if n.iter().zip(bounds).any(|(&c, b)| c < 0 || c >= b) {
                            continue;
                        }
                        let neighbor = index(n[0] as usize, n[1] as usize, n[2] as usize);
                        link_base(&mut nodes, NodeId(index(ix, iy, iz)), NodeId(neighbor));
                    }
                }
            }
        }

        nodes[index(sx / 2, sy / 2, 0)].identifier = "start".into();
        nodes[index(sx / 2, sy / 2, sz - 1)].identifier = "end".into();

        debug!("built {}x{}x{} grid with {} nodes", sx, sy, sz, nodes.len());
        MazeGraph::new(nodes, config.scale, sz, sx * sy * sz, Vec::new(), rng)
    }

    fn descriptor(&self) -> String {
        let [x, y, z] = self.dimensions();
        format!("Grid-{x}x{y}x{z}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(grid: &GridTopology, config: &MazeConfig) -> MazeGraph {
        grid.build(config, &mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_even_sizes_bumped_to_odd() {
        let grid = GridTopology::new(4, 1, 2);
        assert_eq!(grid.dimensions(), [5, 1, 3]);
        let graph = build(&grid, &MazeConfig::default());
        assert_eq!(graph.node_count(), 15);
        assert_eq!(graph.min_path_length(), 3);
        assert_eq!(graph.max_path_length(), 15);
        assert_eq!(grid.descriptor(), "Grid-5x1x3");
    }

    #[test]
    fn test_terminals_on_centre_column() {
        let config = MazeConfig::new(Float3::new(2.0, 2.0, 3.0), 0);
        let graph = build(&GridTopology::new(5, 1, 5), &config);
        let start = graph.start_node();
        let end = graph.end_node();
        assert_eq!(start.identifier, "start");
        assert_eq!(end.identifier, "end");
        assert_relative_eq!(start.position.x, 4.0, epsilon = 1e-6);
        assert_relative_eq!(start.position.z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(end.position.z, 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_axis_links_are_symmetric() {
        let graph = build(&GridTopology::new(3, 3, 3), &MazeConfig::default());
        assert!(graph.is_consistent());
        // Centre node links all six directions, corners three.
        let centre = graph.find(".1.1.1").unwrap();
        assert_eq!(graph.node(centre).all_neighbors().len(), 6);
        let corner = graph.find(".0.0.0").unwrap();
        assert_eq!(graph.node(corner).all_neighbors().len(), 3);
        for id in graph.ids() {
            assert!(graph.node(id).connected_neighbors().is_empty());
        }
    }

    #[test]
    fn test_slanted_links() {
        let graph = build(&GridTopology::new(3, 3, 3).with_slanted(true), &MazeConfig::default());
        let centre = graph.find(".1.1.1").unwrap();
        assert_eq!(graph.node(centre).all_neighbors().len(), 6 + 16);
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_invalid_sizes() {
        let config = MazeConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            GridTopology::new(0, 1, 5).build(&config, &mut rng),
            Err(MazeError::InvalidGridSize(_))
        ));
        assert!(matches!(
            GridTopology::new(3, 3, 1).build(&config, &mut rng),
            Err(MazeError::InvalidGridSize(_))
        ));
    }

    #[test]
    fn test_jitter_is_seeded() {
        let config = MazeConfig::new(Float3::ONE, 0).with_jitter(0.3);
        let grid = GridTopology::new(3, 1, 3);
        let a = build(&grid, &config);
        let b = build(&grid, &config);
        for (na, nb) in a.nodes().iter().zip(b.nodes()) {
            assert_eq!(na.position, nb.position);
        }
        let lattice = Float3::new(1.0, 0.0, 1.0);
        let moved = a.position(a.find(".1.0.1").unwrap());
        assert!((moved - lattice).abs().component_max() <= 0.3 + 1e-6);
    }
}

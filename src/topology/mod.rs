//! Topology builders: produce empty maze graphs whose nodes carry every
//! possible neighbour link and no carved connections yet.
//!
//! Every builder scales positions by [`MazeConfig::scale`], adds optional
//! jitter drawn from the caller's random generator and returns a graph
//! sorted by identifier with `start` and `end` designated.

mod explicit;
mod grid;
mod icosphere;
mod mesh;
mod quadrant;

pub use explicit::ExplicitTopology;
pub use grid::GridTopology;
pub use icosphere::IcosphereTopology;
pub use mesh::MeshTopology;

use crate::config::MazeConfig;
use crate::error::Result;
use crate::geom::Float3;
use crate::graph::MazeGraph;
use rand::Rng;

/// A shape that can be turned into an empty maze graph.
pub trait Topology {
    /// Builds the node set with all possible links. Randomness (jitter,
    /// unnamed terminals) comes from `rng` only.
    fn build<R: Rng + ?Sized>(&self, config: &MazeConfig, rng: &mut R) -> Result<MazeGraph>;

    /// Short name identifying the shape, used to key seed catalogs.
    fn descriptor(&self) -> String;
}

/// Uniform random offset of at most `jitter * scale` per axis.
pub(crate) fn jitter_offset<R: Rng + ?Sized>(scale: Float3, jitter: f32, rng: &mut R) -> Float3 {
    if jitter <= 0.0 {
        return Float3::ZERO;
    }
    let mut axis = |s: f32| {
        let range = (jitter * s).abs();
        if range > 0.0 {
            rng.gen_range(-range..=range)
        } else {
            0.0
        }
    };
    Float3::new(axis(scale.x), axis(scale.y), axis(scale.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let scale = Float3::new(2.0, 1.0, 4.0);
        for _ in 0..200 {
            let offset = jitter_offset(scale, 0.5, &mut rng);
            assert!(offset.x.abs() <= 1.0);
            assert!(offset.y.abs() <= 0.5);
            assert!(offset.z.abs() <= 2.0);
        }
        assert_eq!(jitter_offset(scale, 0.0, &mut rng), Float3::ZERO);
    }
}

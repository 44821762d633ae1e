use super::SeedCatalog;
use crate::carve::MazeGenerator;
use crate::config::HarvestConfig;
use crate::error::{MazeError, Result};
use crate::topology::Topology;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STAGE: &str = "seed harvest";
const SLOW_HARVEST_ATTEMPTS: usize = 10_000;

/// Difficulty bands `(low, high]` of each tier, easiest first.
///
/// Bands are `difficulty_size` of the limit range wide and spread evenly so
/// the first starts at the lower limit and the last ends at the upper one.
pub fn difficulty_bands(config: &HarvestConfig) -> Result<Vec<(f32, f32)>> {
    let tiers = config.difficulty_tiers;
    let (low, high) = config.difficulty_limits;
    let invalid = MazeError::InvalidDifficultyLimits {
        tiers,
        size: config.difficulty_size,
    };
    if tiers == 0 || high <= low || config.difficulty_size <= 0.0 {
        return Err(invalid);
    }

    let range = high - low;
    let size = config.difficulty_size * range;
    let spacing = if tiers == 1 {
        0.0
    } else {
        (range - tiers as f32 * size) / (tiers - 1) as f32
    };
    if spacing < -f32::EPSILON {
        return Err(invalid);
    }

    Ok((0..tiers)
        .map(|tier| {
            let lo = low + (size + spacing) * tier as f32;
            (lo, lo + size)
        })
        .collect())
}

/// Generates mazes from candidate seeds and files every seed whose
/// difficulty falls into a tier band, until each tier holds
/// `mazes_per_tier` seeds.
///
/// With a quadrant, mazes are carved inside that quadrant only and their
/// difficulty is measured against its node count. Candidates are drawn from
/// `config.seed`, so a harvest is reproducible.
pub fn harvest_seeds<T: Topology>(
    generator: &mut MazeGenerator<T>,
    config: &HarvestConfig,
    quadrant: Option<usize>,
) -> Result<SeedCatalog> {
    let bands = difficulty_bands(config)?;
    let mut candidates = StdRng::seed_from_u64(config.seed);
    let mut catalog = SeedCatalog::new(0, generator.descriptor(), bands.len());
    let full = |catalog: &SeedCatalog| {
        catalog
            .seeds
            .iter()
            .all(|tier| tier.len() >= config.mazes_per_tier)
    };

    let mut attempts = 0;
    while !full(&catalog) {
        if attempts >= config.max_attempts {
            warn!(
                "giving up after {} attempts with tiers at {:?}",
                attempts,
                catalog.seeds.iter().map(Vec::len).collect::<Vec<_>>()
            );
            return Err(MazeError::NonTermination { stage: STAGE });
        }
        attempts += 1;
        if attempts % SLOW_HARVEST_ATTEMPTS == 0 {
            warn!(
                "{} attempts and tiers still at {:?}",
                attempts,
                catalog.seeds.iter().map(Vec::len).collect::<Vec<_>>()
            );
        }

        let seed = u64::from(candidates.gen::<u32>());
        if catalog.contains(seed) {
            continue;
        }
        generator.reseed(seed);
        let mut graph = generator.empty_graph()?;
        let index = match quadrant {
            Some(q) => generator.generate_in_quadrant(&mut graph, q)?,
            None => generator.carve_and_label(&mut graph)?,
        };
        catalog.maze_size = graph.node_count();
        let difficulties = graph.difficulty(quadrant)?;
        let Some(&difficulty) = difficulties.get(&index) else {
            continue;
        };
        trace!("seed {} has difficulty {:.4}", seed, difficulty);

        let tier = bands.iter().position(|&(lo, hi)| lo < difficulty && difficulty <= hi);
        if let Some(tier) = tier {
            if catalog.seeds[tier].len() < config.mazes_per_tier {
                catalog.push(tier, seed, difficulty)?;
                debug!(
                    "tier {} took seed {} ({}/{})",
                    tier,
                    seed,
                    catalog.seeds[tier].len(),
                    config.mazes_per_tier
                );
            }
        }
    }

    debug!(
        "harvested {} tiers of {} seeds for {} in {} attempts",
        bands.len(),
        config.mazes_per_tier,
        catalog.creator,
        attempts
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CarveAlgorithm, MazeConfig};
    use crate::geom::Float3;
    use crate::topology::{GridTopology, IcosphereTopology};
    use approx::assert_relative_eq;

    fn grid_generator(size: usize) -> MazeGenerator<GridTopology> {
        let config = MazeConfig::new(Float3::ONE, 0).with_carve(CarveAlgorithm::RecursiveBacktracking);
        MazeGenerator::new(GridTopology::new(size, 1, size), config)
    }

    fn wide_open(tiers: usize, per_tier: usize) -> HarvestConfig {
        HarvestConfig {
            difficulty_tiers: tiers,
            mazes_per_tier: per_tier,
            difficulty_size: 1.0 / tiers as f32,
            difficulty_limits: (-1.0, 1.0),
            seed: 7,
            max_attempts: 1_000,
        }
    }

    #[test]
    fn test_default_bands() {
        let bands = difficulty_bands(&HarvestConfig::default()).unwrap();
        assert_eq!(bands.len(), 2);
        assert_relative_eq!(bands[0].0, 0.05, epsilon = 1e-6);
        assert_relative_eq!(bands[0].1, 0.078, epsilon = 1e-6);
        assert_relative_eq!(bands[1].0, 0.092, epsilon = 1e-6);
        assert_relative_eq!(bands[1].1, 0.12, epsilon = 1e-6);
    }

    #[test]
    fn test_single_band_spans_limits() {
        let config = HarvestConfig {
            difficulty_tiers: 1,
            difficulty_size: 1.0,
            ..HarvestConfig::default()
        };
        let bands = difficulty_bands(&config).unwrap();
        assert_relative_eq!(bands[0].0, 0.05, epsilon = 1e-6);
        assert_relative_eq!(bands[0].1, 0.12, epsilon = 1e-6);
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let config = HarvestConfig {
            difficulty_tiers: 3,
            difficulty_size: 0.5,
            ..HarvestConfig::default()
        };
        assert!(matches!(
            difficulty_bands(&config),
            Err(MazeError::InvalidDifficultyLimits { tiers: 3, .. })
        ));
        let config = HarvestConfig {
            difficulty_tiers: 0,
            ..HarvestConfig::default()
        };
        assert!(difficulty_bands(&config).is_err());
    }

    #[test]
    fn test_harvested_seeds_reproduce_their_difficulty() {
        let mut generator = grid_generator(5);
        let catalog = harvest_seeds(&mut generator, &wide_open(1, 3), None).unwrap();
        assert_eq!(catalog.maze_size, 25);
        assert_eq!(catalog.creator, "Grid-5x1x5-1x1x1");
        assert_eq!(catalog.seeds[0].len(), 3);

        for (&seed, &difficulty) in catalog.seeds[0].iter().zip(&catalog.difficulties[0]) {
            generator.reseed(seed);
            let graph = generator.generate().unwrap();
            assert_relative_eq!(graph.difficulty(None).unwrap()[&0], difficulty, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_harvest_is_reproducible() {
        // Bands (-0.1, 0.3] and (0.3, 0.7].
        let config = HarvestConfig {
            difficulty_tiers: 2,
            mazes_per_tier: 2,
            difficulty_size: 0.5,
            difficulty_limits: (-0.1, 0.7),
            seed: 3,
            max_attempts: 1_000,
        };
        let first = harvest_seeds(&mut grid_generator(5), &config, None).unwrap();
        let second = harvest_seeds(&mut grid_generator(5), &config, None).unwrap();
        assert_eq!(first, second);
        for (tier, difficulties) in first.difficulties.iter().enumerate() {
            assert_eq!(difficulties.len(), 2);
            for &d in difficulties {
                assert!(if tier == 0 { d <= 0.3 } else { d > 0.3 });
            }
        }
    }

    #[test]
    fn test_unreachable_band_gives_up() {
        // A 3x3 maze never gets harder than (8 - 3) / 9.
        let config = HarvestConfig {
            difficulty_tiers: 1,
            mazes_per_tier: 1,
            difficulty_size: 1.0,
            difficulty_limits: (0.9, 1.0),
            seed: 0,
            max_attempts: 50,
        };
        assert!(matches!(
            harvest_seeds(&mut grid_generator(3), &config, None),
            Err(MazeError::NonTermination { stage: STAGE })
        ));
    }

    #[test]
    fn test_quadrant_harvest() {
        let config = MazeConfig::new(Float3::ONE, 0);
        let topology = IcosphereTopology::new(2).with_quadrants(2);
        let mut generator = MazeGenerator::new(topology, config);
        let catalog = harvest_seeds(&mut generator, &wide_open(1, 2), Some(1)).unwrap();
        assert_eq!(catalog.seeds[0].len(), 2);
        assert!(catalog.creator.starts_with("Icosphere-2"));
    }
}

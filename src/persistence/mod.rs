//! Seed catalogs: per-difficulty lists of maze seeds, stored as JSON.
//!
//! A catalog is written offline by [`harvest_seeds`] and read by level
//! builders that want a maze of a given difficulty without generating and
//! measuring candidates at load time.

mod harvest;

pub use harvest::{difficulty_bands, harvest_seeds};

use crate::error::{MazeError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCatalog {
    /// Node count of the mazes the seeds were measured on.
    pub maze_size: usize,
    /// Descriptor of the generator that produced the mazes.
    pub creator: String,
    pub difficulty_tiers: usize,
    /// Seeds per tier, easiest tier first.
    pub seeds: Vec<Vec<u64>>,
    /// Measured difficulty of each seed, parallel to `seeds`.
    pub difficulties: Vec<Vec<f32>>,
}

impl SeedCatalog {
    pub fn new(maze_size: usize, creator: impl Into<String>, difficulty_tiers: usize) -> Self {
        Self {
            maze_size,
            creator: creator.into(),
            difficulty_tiers,
            seeds: vec![Vec::new(); difficulty_tiers],
            difficulties: vec![Vec::new(); difficulty_tiers],
        }
    }

    pub fn push(&mut self, tier: usize, seed: u64, difficulty: f32) -> Result<()> {
        self.check_tier(tier)?;
        self.seeds[tier].push(seed);
        self.difficulties[tier].push(difficulty);
        Ok(())
    }

    pub fn contains(&self, seed: u64) -> bool {
        self.seeds.iter().any(|tier| tier.contains(&seed))
    }

    /// Random seed of the given tier.
    pub fn pick<R: Rng + ?Sized>(&self, tier: usize, rng: &mut R) -> Result<u64> {
        self.check_tier(tier)?;
        let seeds = &self.seeds[tier];
        if seeds.is_empty() {
            return Err(MazeError::EmptyTier(tier));
        }
        Ok(seeds[rng.gen_range(0..seeds.len())])
    }

    fn check_tier(&self, tier: usize) -> Result<()> {
        if tier < self.seeds.len() {
            Ok(())
        } else {
            Err(MazeError::TierOutOfRange {
                tier,
                count: self.seeds.len(),
            })
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// File name of the catalog for a generator descriptor. `quadrant` is the
/// zero-based quadrant and the quadrant count; the name numbers quadrants
/// from one.
pub fn catalog_file_name(descriptor: &str, quadrant: Option<(usize, usize)>) -> String {
    match quadrant {
        Some((index, count)) => {
            format!("mazeDifficultySeeds-{descriptor}-quadrant{}of{count}.json", index + 1)
        }
        None => format!("mazeDifficultySeeds-{descriptor}.json"),
    }
}

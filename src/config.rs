//! Tunables for maze generation, curve fitting and seed harvesting.
//!
//! Every struct deserializes from JSON with missing fields taking their
//! defaults, so a host can override only what it cares about.

use crate::error::Result;
use crate::geom::Float3;
use serde::{Deserialize, Serialize};

/// Upper bound on node jitter, as a fraction of the scale.
pub const MAX_JITTER: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Distance between neighbouring grid nodes per axis.
    pub scale: Float3,
    /// Random per-axis node offset as a fraction of `scale`.
    pub jitter: f32,
    pub seed: u64,
    pub carve: CarveAlgorithm,
}

impl MazeConfig {
    pub fn new(scale: Float3, seed: u64) -> Self {
        Self {
            scale,
            seed,
            ..Self::default()
        }
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.clamp(0.0, MAX_JITTER);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_carve(mut self, carve: CarveAlgorithm) -> Self {
        self.carve = carve;
        self
    }

    /// Parses a JSON object; out-of-range jitter is clamped.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.with_jitter(config.jitter))
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            scale: Float3::ONE,
            jitter: 0.0,
            seed: 0,
            carve: CarveAlgorithm::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarveAlgorithm {
    RecursiveBacktracking,
    HuntAndKill {
        /// World-space run length after which a hunt may start.
        hunt_after_segment_length: f32,
        /// Chance of hunting once that length is reached.
        hunt_probability: f64,
    },
}

impl Default for CarveAlgorithm {
    fn default() -> Self {
        Self::HuntAndKill {
            hunt_after_segment_length: 50.0,
            hunt_probability: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineConfig {
    /// Control points per curve segment before a split.
    pub max_degree: usize,
    pub min_degree: usize,
    /// Arc-length samples per unique control point.
    pub samples_per_control_point: usize,
    /// Fraction of the shorter adjacent leg used to place continuity handles.
    pub continuity_factor: f32,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            max_degree: 4,
            min_degree: 4,
            samples_per_control_point: 20,
            continuity_factor: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// How far spline ends stop short of a junction, as a fraction of the
    /// distance to the neighbouring node.
    pub junction_space: f32,
    pub spline: SplineConfig,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            junction_space: 0.5,
            spline: SplineConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub difficulty_tiers: usize,
    pub mazes_per_tier: usize,
    /// Width of each tier as a fraction of the covered difficulty range.
    pub difficulty_size: f32,
    /// Lower and upper difficulty covered by the tiers.
    pub difficulty_limits: (f32, f32),
    /// Seed of the generator that draws candidate maze seeds.
    pub seed: u64,
    pub max_attempts: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            difficulty_tiers: 2,
            mazes_per_tier: 20,
            difficulty_size: 0.4,
            difficulty_limits: (0.05, 0.12),
            seed: 0,
            max_attempts: 100_000,
        }
    }
}

//! Crate-wide error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MazeError {
    // --- Graph contract violations ---
    #[error("nodes '{a}' and '{b}' are not possible neighbors of each other")]
    NotNeighbors { a: String, b: String },

    #[error("node '{0}' cannot be connected to itself")]
    SelfConnection(String),

    #[error("start and end nodes are required to be active")]
    InactiveTerminal,

    #[error("graph has no node named '{0}'")]
    MissingTerminal(&'static str),

    #[error("graph needs at least two nodes, found {0}")]
    TooFewNodes(usize),

    #[error("shortest-path index sets differ: {first:?} vs {second:?}")]
    PathIndexMismatch { first: Vec<u32>, second: Vec<u32> },

    #[error("shortest-path index {0} is present in both graphs")]
    DuplicatePathIndex(u32),

    #[error("graph scales differ")]
    ScaleMismatch,

    #[error("graphs do not share the same topology: {0}")]
    TopologyMismatch(String),

    #[error("shrink factor {0} must be within [0, 1]")]
    InvalidShrinkFactor(f32),

    #[error("composition needs at least one graph")]
    EmptyComposition,

    #[error("end node cannot be reached from the start node")]
    EndUnreachable,

    #[error("path segments have already been computed for this graph")]
    SegmentsAlreadyComputed,

    #[error("path segments are required but have not been computed")]
    MissingPathSegments,

    // --- Topology ---
    #[error("unsupported quadrant count {0}")]
    UnsupportedQuadrantCount(usize),

    #[error("quadrant {index} out of range, graph has {count}")]
    QuadrantOutOfRange { index: usize, count: usize },

    #[error("invalid grid size {0:?}")]
    InvalidGridSize([usize; 3]),

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    // --- Curves ---
    #[error("a curve segment needs at least {needed} control points, got {got}")]
    TooFewControlPoints { needed: usize, got: usize },

    #[error("distance {distance} is outside the spline length {total}")]
    DistanceOutOfRange { distance: f32, total: f32 },

    // --- Seed harvesting ---
    #[error("difficulty limits leave no room for {tiers} tiers of size {size}")]
    InvalidDifficultyLimits { tiers: usize, size: f32 },

    #[error("difficulty tier {tier} not present, catalog has {count}")]
    TierOutOfRange { tier: usize, count: usize },

    #[error("difficulty tier {0} holds no seeds")]
    EmptyTier(usize),

    // --- Guards ---
    #[error("{stage} loop did not terminate correctly")]
    NonTermination { stage: &'static str },

    // --- Persistence ---
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;

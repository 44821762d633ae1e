//! MazeCore - procedural 3D maze generation and track curve fitting.
//!
//! # Architecture
//!
//! Layered modules with strict inward-only dependencies:
//!
//! - **geom**: Math primitives (Float3, Quaternion, Frame)
//! - **graph**: Maze node arena, traversal, segmentation and composition
//! - **topology**: Grid, icosphere, mesh and explicit node layouts
//! - **carve**: Spanning-tree carving and shortest-path labeling
//! - **curve**: Bezier curves, splines, rotation-minimizing frames
//! - **track**: Spline segments fitted to a segmented maze
//! - **persistence**: Seed catalogs and the offline seed harvest
//! - **ffi**: C FFI bindings
//!
//! # Usage
//!
//! ```no_run
//! use mazecore::{Float3, GridTopology, MazeConfig, MazeGenerator};
//!
//! let config = MazeConfig::new(Float3::splat(10.0), 42);
//! let mut generator = MazeGenerator::new(GridTopology::new(5, 1, 5), config);
//! let mut maze = generator.generate()?;
//! maze.add_path_segments()?;
//! # Ok::<(), mazecore::MazeError>(())
//! ```
//!
//! For C/C#/Unity, build with the `ffi` feature, link the cdylib and use the
//! `maze_*` functions.

pub mod carve;
pub mod config;
pub mod curve;
pub mod error;
pub mod geom;
pub mod graph;
pub mod persistence;
pub mod topology;
pub mod track;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types at crate root
pub use carve::{label_shortest_path, MazeGenerator};
pub use config::{CarveAlgorithm, HarvestConfig, MazeConfig, SplineConfig, TrackConfig};
pub use curve::{BezierCurve, Curve, RotationMinimizingFrames, Spline};
pub use error::{MazeError, Result};
pub use geom::{Float3, Quaternion};
pub use graph::{MazeGraph, MazeNode, NodeId};
pub use persistence::{catalog_file_name, harvest_seeds, SeedCatalog};
pub use topology::{ExplicitTopology, GridTopology, IcosphereTopology, MeshTopology, Topology};
pub use track::{MazeTrack, SplineSegment};

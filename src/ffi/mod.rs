//! C ABI for hosts that generate mazes and fit curves outside Rust.
//!
//! Functions:
//! - `maze_generate_grid` - carve a grid maze from a seed
//! - `maze_generate_icosphere` - carve an icosphere maze from a seed
//! - `maze_spline_sample` - sample a spline through caller positions
//!
//! # Error Codes
//! - `0`: Success
//! - `-1`: Null pointer
//! - `-2`: Generation failed
//! - `-3`: Buffer overflow (resize and retry; counts hold the required sizes)
//! - `-4`: Internal panic (caught before it reaches the caller)

use crate::carve::MazeGenerator;
use crate::config::{MazeConfig, SplineConfig};
use crate::curve::{Curve, Spline};
use crate::geom::Float3;
use crate::graph::MazeGraph;
use crate::topology::{GridTopology, IcosphereTopology, Topology};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub const MAZE_FLAG_SHORTEST_PATH: u8 = 1;
pub const MAZE_FLAG_DEAD_END: u8 = 1 << 1;
pub const MAZE_FLAG_LOOP: u8 = 1 << 2;
pub const MAZE_FLAG_NOT_CONNECTED: u8 = 1 << 3;
pub const MAZE_FLAG_JUNCTION: u8 = 1 << 4;

/// Output buffers for a generated maze.
#[repr(C)]
pub struct MazeOutput {
    // Per node
    pub positions: *mut Float3,
    pub flags: *mut u8,
    pub nodes_capacity: usize,

    // Carved connections as index pairs, two entries per edge
    pub edges: *mut u32,
    pub edges_capacity: usize,

    // Written on return
    pub node_count: *mut usize,
    pub edge_count: *mut usize,
    pub start_index: *mut u32,
    pub end_index: *mut u32,
}

/// Carve a grid maze and copy it into `output`.
///
/// # Safety
///
/// - `output` must point to a `MazeOutput` whose buffers are valid for their
///   capacities and whose count pointers are valid
#[no_mangle]
pub unsafe extern "C" fn maze_generate_grid(
    size_x: u32,
    size_y: u32,
    size_z: u32,
    scale: Float3,
    seed: u64,
    output: *mut MazeOutput,
) -> i32 {
    let topology = GridTopology::new(size_x as usize, size_y as usize, size_z as usize);
    generate_into(topology, scale, seed, output)
}

/// Carve an icosphere maze and copy it into `output`.
///
/// # Safety
///
/// Same requirements as [`maze_generate_grid`].
#[no_mangle]
pub unsafe extern "C" fn maze_generate_icosphere(
    divisions: u32,
    scale: Float3,
    seed: u64,
    output: *mut MazeOutput,
) -> i32 {
    generate_into(IcosphereTopology::new(divisions as usize), scale, seed, output)
}

/// Sample `sample_count` evenly spaced parameter values of a spline through
/// `points` into `samples`.
///
/// # Safety
///
/// - `points` must be valid for `point_count` reads
/// - `samples` must be valid for `sample_count` writes
#[no_mangle]
pub unsafe extern "C" fn maze_spline_sample(
    points: *const Float3,
    point_count: usize,
    samples: *mut Float3,
    sample_count: usize,
) -> i32 {
    if points.is_null() || samples.is_null() {
        return -1;
    }
    let points = std::slice::from_raw_parts(points, point_count);
    let spline = match guarded(|| Spline::new(points, SplineConfig::default())) {
        Ok(Ok(s)) => s,
        Ok(Err(_)) => return -2,
        Err(code) => return code,
    };
    let sampled = guarded(|| {
        let last = sample_count.saturating_sub(1).max(1) as f32;
        (0..sample_count)
            .map(|i| spline.point(i as f32 / last))
            .collect::<Vec<_>>()
    });
    match sampled {
        Ok(values) => {
            std::ptr::copy_nonoverlapping(values.as_ptr(), samples, values.len());
            0
        }
        Err(code) => code,
    }
}

// --- Helpers ---

unsafe fn generate_into<T: Topology>(
    topology: T,
    scale: Float3,
    seed: u64,
    output: *mut MazeOutput,
) -> i32 {
    if output.is_null() {
        return -1;
    }
    let output = &mut *output;
    if output.node_count.is_null()
        || output.edge_count.is_null()
        || output.start_index.is_null()
        || output.end_index.is_null()
    {
        return -1;
    }

    let generated = guarded(move || {
        MazeGenerator::new(topology, MazeConfig::new(scale, seed)).generate()
    });
    match generated {
        Ok(Ok(graph)) => write_maze(&graph, output),
        Ok(Err(_)) => -2,
        Err(code) => code,
    }
}

/// Runs `f`, turning a panic into error code -4 so it never unwinds across
/// the C boundary.
fn guarded<R>(f: impl FnOnce() -> R) -> Result<R, i32> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|_| -4)
}

unsafe fn write_maze(graph: &MazeGraph, output: &mut MazeOutput) -> i32 {
    let edges: Vec<(u32, u32)> = graph
        .ids()
        .flat_map(|id| {
            graph
                .node(id)
                .connected_neighbors()
                .iter()
                .filter(move |nb| nb.0 > id.0)
                .map(move |nb| (id.0 as u32, nb.0 as u32))
        })
        .collect();

    *output.node_count = graph.node_count();
    *output.edge_count = edges.len();
    *output.start_index = graph.start().0 as u32;
    *output.end_index = graph.end().0 as u32;

    if graph.node_count() > output.nodes_capacity || edges.len() * 2 > output.edges_capacity {
        return -3;
    }
    if output.positions.is_null() || output.flags.is_null() || output.edges.is_null() {
        return -1;
    }

    for (i, node) in graph.nodes().iter().enumerate() {
        *output.positions.add(i) = node.position;
        *output.flags.add(i) = node_flags(node);
    }
    for (i, &(a, b)) in edges.iter().enumerate() {
        *output.edges.add(2 * i) = a;
        *output.edges.add(2 * i + 1) = b;
    }
    0
}

fn node_flags(node: &crate::graph::MazeNode) -> u8 {
    let mut flags = 0;
    if node.on_shortest_path() {
        flags |= MAZE_FLAG_SHORTEST_PATH;
    }
    if node.on_dead_end {
        flags |= MAZE_FLAG_DEAD_END;
    }
    if node.on_loop {
        flags |= MAZE_FLAG_LOOP;
    }
    if node.not_connected_to_path {
        flags |= MAZE_FLAG_NOT_CONNECTED;
    }
    if node.is_junction() {
        flags |= MAZE_FLAG_JUNCTION;
    }
    flags
}

//! Spline-segment assembly: turns a segmented maze into the curves a
//! renderer sweeps its track meshes along.
//!
//! Every junction gets one short curve per pair of its connections, and
//! every path segment gets one curve through its nodes. Curve ends that meet
//! are linked through `start_neighbors` / `end_neighbors`, so consumers can
//! walk from curve to curve. Once built, every spline is only read, so
//! segments can be sampled in parallel.

use crate::config::TrackConfig;
use crate::curve::Spline;
use crate::error::{MazeError, Result};
use crate::geom::Float3;
use crate::graph::{MazeGraph, MazeNode, NodeId};
use log::debug;
use std::collections::BTreeSet;

/// One fitted curve of a maze track.
#[derive(Debug, Clone)]
pub struct SplineSegment {
    pub spline: Spline,
    /// Nodes the curve was fitted through; junction curves list the junction
    /// first, then the two neighbours.
    pub node_identifiers: Vec<String>,
    pub path_indices: BTreeSet<u32>,
    pub path_indices_at_start: BTreeSet<u32>,
    pub path_indices_at_end: BTreeSet<u32>,
    pub is_junction: bool,
    /// Indices of segments touching this one's start point.
    pub start_neighbors: Vec<usize>,
    /// Indices of segments touching this one's end point.
    pub end_neighbors: Vec<usize>,
}

impl SplineSegment {
    fn new(
        spline: Spline,
        nodes: &[&MazeNode],
        path_indices: BTreeSet<u32>,
        is_junction: bool,
    ) -> Self {
        let (first, last) = if is_junction {
            (nodes[1], nodes[2])
        } else {
            (nodes[0], nodes[nodes.len() - 1])
        };
        Self {
            spline,
            node_identifiers: nodes.iter().map(|n| n.identifier.clone()).collect(),
            path_indices,
            path_indices_at_start: first.path_indices.clone(),
            path_indices_at_end: last.path_indices.clone(),
            is_junction,
            start_neighbors: Vec::new(),
            end_neighbors: Vec::new(),
        }
    }

    pub fn start_point(&self) -> Float3 {
        self.spline.start_point()
    }

    pub fn end_point(&self) -> Float3 {
        self.spline.end_point()
    }
}

/// All spline segments of a maze.
#[derive(Debug, Clone)]
pub struct MazeTrack {
    pub path_indices: Vec<u32>,
    pub segments: Vec<SplineSegment>,
    pub start_point: Float3,
    pub end_point: Float3,
}

impl MazeTrack {
    /// Fits curves to a maze whose path segments have been computed.
    pub fn from_graph(graph: &MazeGraph, config: &TrackConfig) -> Result<Self> {
        let paths = graph.path_segments().ok_or(MazeError::MissingPathSegments)?;
        let center = graph.center();
        let space = config.junction_space;

        let mut segments = Vec::new();
        for junction in graph.ids().filter(|&id| graph.node(id).is_junction()) {
            segments.extend(junction_segments(graph, junction, center, config)?);
        }

        for path in paths.iter().filter(|p| p.len() >= 2) {
            let nodes: Vec<&MazeNode> = path.iter().map(|&id| graph.node(id)).collect();
            let last = nodes.len() - 1;
            if nodes.len() == 2 && nodes[0].is_junction() && nodes[1].is_junction() {
                continue;
            }

            let mut points: Vec<Float3> = nodes.iter().map(|n| n.position).collect();
            if nodes[0].is_junction() {
                points[0] = points[0] + (points[1] - points[0]) * space;
            }
            if nodes[last].is_junction() {
                points[last] = points[last] + (points[last - 1] - points[last]) * space;
            }

            let mut spline = Spline::new(&points, config.spline)?;
            spline.set_rmf_start_normal(end_normal(nodes[0], points[0], center));
            spline.set_rmf_end_normal(end_normal(nodes[last], points[last], center));

            let path_indices = if nodes.len() >= 3 {
                nodes[1].path_indices.clone()
            } else {
                nodes[0]
                    .path_indices
                    .intersection(&nodes[1].path_indices)
                    .copied()
                    .collect()
            };
            segments.push(SplineSegment::new(spline, &nodes, path_indices, false));
        }

        link_neighbors(&mut segments);
        debug!(
            "assembled {} spline segments ({} at junctions)",
            segments.len(),
            segments.iter().filter(|s| s.is_junction).count()
        );

        Ok(Self {
            path_indices: graph.path_indices(),
            segments,
            start_point: graph.start_node().position,
            end_point: graph.end_node().position,
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments carrying a given shortest-path index.
    pub fn on_path(&self, index: u32) -> impl Iterator<Item = &SplineSegment> + '_ {
        self.segments
            .iter()
            .filter(move |s| s.path_indices.contains(&index))
    }
}

/// Entry and exit nodes keep an upright normal; everything else faces the
/// maze centre.
fn end_normal(node: &MazeNode, point: Float3, center: Float3) -> Float3 {
    if node.is_terminal() {
        Float3::UP
    } else {
        center - point
    }
}

/// One curve through the junction for every pair of its connections.
///
/// Junctions next to an entry or exit node only get curves that lead to it.
fn junction_segments(
    graph: &MazeGraph,
    junction: NodeId,
    center: Float3,
    config: &TrackConfig,
) -> Result<Vec<SplineSegment>> {
    let node = graph.node(junction);
    let neighbors = node.connected_neighbors();
    let beside_terminal = neighbors.iter().any(|&nb| graph.node(nb).is_terminal());
    let space = config.junction_space;
    let mut segments = Vec::new();

    for (i, &first) in neighbors.iter().enumerate() {
        for &second in &neighbors[i + 1..] {
            let (a, b) = (graph.node(first), graph.node(second));
            if beside_terminal && !a.is_terminal() && !b.is_terminal() {
                continue;
            }
            let j = node.position;
            let points = [
                j + (a.position - j) * space,
                j,
                j,
                j + (b.position - j) * space,
            ];
            let mut spline = Spline::new(&points, config.spline)?;
            spline.set_rmf_start_normal(end_normal(a, points[0], center));
            spline.set_rmf_end_normal(end_normal(b, points[3], center));
            segments.push(SplineSegment::new(
                spline,
                &[node, a, b],
                node.path_indices.clone(),
                true,
            ));
        }
    }
    Ok(segments)
}

fn link_neighbors(segments: &mut [SplineSegment]) {
    let ends: Vec<(Float3, Float3)> = segments
        .iter()
        .map(|s| (s.start_point(), s.end_point()))
        .collect();
    for (i, segment) in segments.iter_mut().enumerate() {
        let (start, end) = ends[i];
        for (k, &(other_start, other_end)) in ends.iter().enumerate() {
            if k == i {
                continue;
            }
            if start.approx_eq(other_start) || start.approx_eq(other_end) {
                segment.start_neighbors.push(k);
            }
            if end.approx_eq(other_start) || end.approx_eq(other_end) {
                segment.end_neighbors.push(k);
            }
        }
    }
}

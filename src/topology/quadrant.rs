//! Quadrant fences for mesh topologies.
//!
//! Nodes lying on a quadrant boundary are replaced by two copies, one per
//! side, each linked only to the neighbours on its own side. Activating one
//! quadrant then leaves a closed region whose only shared nodes with the
//! other quadrants are start and end.

use crate::error::{MazeError, Result};
use crate::geom::Float3;
use crate::graph::{link_base, unlink_base, MazeNode, NodeId};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn coord(self, p: Float3) -> f32 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    fn unit(self) -> Float3 {
        match self {
            Axis::X => Float3::RIGHT,
            Axis::Y => Float3::UP,
        }
    }
}

/// Fences `nodes` into `count` quadrants around the start node's position.
///
/// Returns the surviving start and end handles and the members of each
/// quadrant. Nodes within `epsilon` of a boundary count as on it.
pub(crate) fn insert_fences(
    nodes: &mut Vec<MazeNode>,
    start: NodeId,
    end: NodeId,
    count: usize,
    epsilon: f32,
) -> Result<(NodeId, NodeId, Vec<Vec<NodeId>>)> {
    let axes: &[Axis] = match count {
        2 => &[Axis::Y],
        4 => &[Axis::Y, Axis::X],
        n => return Err(MazeError::UnsupportedQuadrantCount(n)),
    };

    for terminal in [start, end] {
        trim_terminal(nodes, terminal, count);
    }

    let back = nodes[start.0].position;
    let mut doomed = vec![false; nodes.len()];
    for &axis in axes {
        let boundary: Vec<NodeId> = (0..nodes.len())
            .map(NodeId)
            .filter(|&id| id != start && id != end && !doomed[id.0])
            .filter(|&id| (axis.coord(nodes[id.0].position) - axis.coord(back)).abs() < epsilon)
            .collect();
        for id in boundary {
            split(nodes, id, axis, epsilon);
            doomed[id.0] = true;
        }
        doomed.resize(nodes.len(), false);
    }

    let fenced = doomed.iter().filter(|&&d| d).count();
    let remap = remove_nodes(nodes, &doomed);
    let (Some(start), Some(end)) = (remap[start.0], remap[end.0]) else {
        return Err(MazeError::MissingTerminal("start"));
    };

    let quadrants = membership(nodes, back, count, epsilon);
    debug!(
        "fenced {} boundary nodes into {} quadrants of sizes {:?}",
        fenced,
        count,
        quadrants.iter().map(Vec::len).collect::<Vec<_>>()
    );
    Ok((start, end, quadrants))
}

/// Thins a terminal's links so each quadrant reaches it from one side only.
fn trim_terminal(nodes: &mut [MazeNode], terminal: NodeId, count: usize) {
    let y = |nodes: &[MazeNode], id: NodeId| nodes[id.0].position.y;
    let highest = |nodes: &[MazeNode]| {
        nodes[terminal.0]
            .all_neighbors
            .iter()
            .copied()
            .reduce(|a, b| if y(nodes, b) > y(nodes, a) { b } else { a })
    };
    let lowest = |nodes: &[MazeNode]| {
        nodes[terminal.0]
            .all_neighbors
            .iter()
            .copied()
            .reduce(|a, b| if y(nodes, b) < y(nodes, a) { b } else { a })
    };

    if count == 4 {
        if let Some(top) = highest(&*nodes) {
            unlink_base(nodes, terminal, top);
        }
        if let Some(bottom) = lowest(&*nodes) {
            unlink_base(nodes, terminal, bottom);
        }
    } else {
        let keep = [highest(&*nodes), lowest(&*nodes)];
        let others: Vec<NodeId> = nodes[terminal.0]
            .all_neighbors
            .iter()
            .copied()
            .filter(|nb| !keep.contains(&Some(*nb)))
            .collect();
        for nb in others {
            unlink_base(nodes, terminal, nb);
        }
    }
}

/// Appends the two side copies of a boundary node. The original keeps its
/// links until it is removed.
fn split(nodes: &mut Vec<MazeNode>, id: NodeId, axis: Axis, epsilon: f32) {
    let original = &nodes[id.0];
    let coord = axis.coord(original.position);
    let shift = axis.unit() * (2.0 * epsilon);

    // For y the first copy is the upper side, for x the lower side.
    let first_upper = axis == Axis::Y;
    let first_shift = if first_upper { shift } else { -shift };
    let sides = [
        (first_shift, first_upper, "1"),
        (-first_shift, !first_upper, "2"),
    ];
    let position = original.position;
    let identifier = original.identifier.clone();
    let neighbors = original.all_neighbors.clone();

    for (offset, upper, suffix) in sides {
        nodes.push(MazeNode::new(position + offset, format!("{identifier}{suffix}")));
        let copy = NodeId(nodes.len() - 1);
        for &nb in &neighbors {
            let other = axis.coord(nodes[nb.0].position);
            let same_side = if upper {
                other > coord - epsilon
            } else {
                other < coord + epsilon
            };
            if same_side {
                link_base(nodes, copy, nb);
            }
        }
    }
}

/// Drops flagged nodes and compacts the arena. Returns the new handle of
/// every old node, `None` for removed ones.
fn remove_nodes(nodes: &mut Vec<MazeNode>, doomed: &[bool]) -> Vec<Option<NodeId>> {
    let mut remap = Vec::with_capacity(nodes.len());
    let mut next = 0;
    for &gone in doomed {
        if gone {
            remap.push(None);
        } else {
            remap.push(Some(NodeId(next)));
            next += 1;
        }
    }

    let old: Vec<MazeNode> = std::mem::take(nodes);
    for (i, mut node) in old.into_iter().enumerate() {
        if doomed[i] {
            continue;
        }
        node.all_neighbors = node
            .all_neighbors
            .iter()
            .filter_map(|nb| remap[nb.0])
            .collect();
        node.connected_neighbors = node
            .connected_neighbors
            .iter()
            .filter_map(|nb| remap[nb.0])
            .collect();
        nodes.push(node);
    }
    remap
}

fn membership(nodes: &[MazeNode], back: Float3, count: usize, tol: f32) -> Vec<Vec<NodeId>> {
    (0..count)
        .map(|quadrant| {
            (0..nodes.len())
                .map(NodeId)
                .filter(|id| in_quadrant(nodes[id.0].position, quadrant, count, back, tol))
                .collect()
        })
        .collect()
}

fn in_quadrant(p: Float3, quadrant: usize, count: usize, back: Float3, tol: f32) -> bool {
    let above = p.y > back.y - tol;
    let below = p.y < back.y + tol;
    let right = p.x > back.x - tol;
    let left = p.x < back.x + tol;
    match (count, quadrant) {
        (2, 0) => above,
        (2, 1) => below,
        (4, 0) => right && above,
        (4, 1) => right && below,
        (4, 2) => left && below,
        (4, 3) => left && above,
        _ => false,
    }
}

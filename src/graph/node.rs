use crate::geom::Float3;
use std::collections::BTreeSet;
use std::fmt;

/// Stable handle of a node inside one [`MazeGraph`](super::MazeGraph).
///
/// Handles are plain indices into the graph's node arena and are only
/// meaningful for the graph that issued them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point in the maze topology.
///
/// `all_neighbors` lists the links the topology allows; `connected_neighbors`
/// is the carved subset. Both are kept symmetric by the owning graph.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeNode {
    pub identifier: String,
    pub position: Float3,
    pub active: bool,
    pub on_dead_end: bool,
    pub on_loop: bool,
    pub not_connected_to_path: bool,
    pub path_indices: BTreeSet<u32>,
    pub(crate) all_neighbors: Vec<NodeId>,
    pub(crate) connected_neighbors: Vec<NodeId>,
}

impl MazeNode {
    pub fn new(position: Float3, identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            position,
            active: true,
            on_dead_end: false,
            on_loop: false,
            not_connected_to_path: false,
            path_indices: BTreeSet::new(),
            all_neighbors: Vec::new(),
            connected_neighbors: Vec::new(),
        }
    }

    pub fn all_neighbors(&self) -> &[NodeId] {
        &self.all_neighbors
    }

    pub fn connected_neighbors(&self) -> &[NodeId] {
        &self.connected_neighbors
    }

    pub fn connection_count(&self) -> usize {
        self.connected_neighbors.len()
    }

    pub fn on_shortest_path(&self) -> bool {
        !self.path_indices.is_empty()
    }

    pub fn is_junction(&self) -> bool {
        self.connected_neighbors.len() >= 3
    }

    /// Entry/exit nodes whose splines are oriented to world up.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.identifier.as_str(),
            "start" | "end" | "interim-start" | "interim-end"
        )
    }

    pub fn clear_labels(&mut self) {
        self.on_dead_end = false;
        self.on_loop = false;
        self.not_connected_to_path = false;
        self.path_indices.clear();
    }

    /// Union of path labels: flags are OR-ed except `not_connected_to_path`,
    /// which only survives if both sides carry it.
    pub(crate) fn absorb_labels(&mut self, other: &MazeNode) {
        self.on_dead_end |= other.on_dead_end;
        self.on_loop |= other.on_loop;
        self.not_connected_to_path &= other.not_connected_to_path;
        self.path_indices.extend(other.path_indices.iter().copied());
    }
}

// --- Arena helpers ---
//
// Builders assemble plain node vectors before a graph exists, so the symmetric
// link primitives operate on slices.

fn push_unique(list: &mut Vec<NodeId>, id: NodeId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Adds a symmetric topology link. Self-links are ignored.
pub(crate) fn link_base(nodes: &mut [MazeNode], a: NodeId, b: NodeId) {
    if a == b {
        return;
    }
    push_unique(&mut nodes[a.0].all_neighbors, b);
    push_unique(&mut nodes[b.0].all_neighbors, a);
}

/// Removes a topology link and any carved connection over it.
pub(crate) fn unlink_base(nodes: &mut [MazeNode], a: NodeId, b: NodeId) {
    nodes[a.0].all_neighbors.retain(|&n| n != b);
    nodes[b.0].all_neighbors.retain(|&n| n != a);
    unlink_connected(nodes, a, b);
}

/// Adds a symmetric carved connection without checking the topology.
pub(crate) fn link_connected(nodes: &mut [MazeNode], a: NodeId, b: NodeId) {
    if a == b {
        return;
    }
    push_unique(&mut nodes[a.0].connected_neighbors, b);
    push_unique(&mut nodes[b.0].connected_neighbors, a);
}

pub(crate) fn unlink_connected(nodes: &mut [MazeNode], a: NodeId, b: NodeId) {
    nodes[a.0].connected_neighbors.retain(|&n| n != b);
    nodes[b.0].connected_neighbors.retain(|&n| n != a);
}

/// Reorders nodes by identifier and rewrites every adjacency handle.
///
/// Returns the mapping from old handle to new handle.
pub(crate) fn sort_by_identifier(nodes: &mut Vec<MazeNode>) -> Vec<NodeId> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| nodes[a].identifier.cmp(&nodes[b].identifier));

    let mut remap = vec![NodeId(0); nodes.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = NodeId(new);
    }

    let mut taken: Vec<Option<MazeNode>> = nodes.drain(..).map(Some).collect();
    for &old in &order {
        if let Some(mut node) = taken[old].take() {
            for n in node.all_neighbors.iter_mut() {
                *n = remap[n.0];
            }
            for n in node.connected_neighbors.iter_mut() {
                *n = remap[n.0];
            }
            nodes.push(node);
        }
    }
    remap
}

use super::{link_base, link_connected, MazeGraph, MazeNode, NodeId};
use crate::geom::{Float3, Quaternion};
use std::collections::BTreeMap;

/// Which terminal an offset node extends.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Terminal {
    Start,
    End,
}

impl MazeGraph {
    // --- Rigid transforms ---

    pub fn translate(&mut self, offset: Float3) {
        for node in &mut self.nodes {
            node.position += offset;
        }
    }

    /// Rotates every node about the origin.
    pub fn rotate(&mut self, rotation: Quaternion) {
        for node in &mut self.nodes {
            node.position = rotation.mul_vec(node.position);
        }
    }

    /// Scales positions about the origin; the graph scale follows.
    pub fn apply_scale(&mut self, factor: f32) {
        for node in &mut self.nodes {
            node.position = node.position * factor;
        }
        self.scale = self.scale * factor;
    }

    // --- Renaming ---

    pub(crate) fn rename(&mut self, id: NodeId, identifier: impl Into<String>) {
        self.nodes[id.0].identifier = identifier.into();
    }

    pub(crate) fn prefix_identifiers(&mut self, prefix: &str) {
        for node in &mut self.nodes {
            node.identifier = format!("{prefix}{}", node.identifier);
        }
    }

    /// Shifts every shortest-path index by `by`.
    pub fn increment_path_indices(&mut self, by: u32) {
        self.path_lengths = std::mem::take(&mut self.path_lengths)
            .into_iter()
            .map(|(index, length)| (index + by, length))
            .collect::<BTreeMap<_, _>>();
        for node in &mut self.nodes {
            node.path_indices = node.path_indices.iter().map(|i| i + by).collect();
        }
    }

    // --- Entry and exit extensions ---

    /// Moves the start `offset` away from the maze.
    ///
    /// The old start is renamed `entry`; with `intermediate` an
    /// `interim-start` node sits half way.
    pub fn add_offset_start_node(&mut self, offset: Float3, intermediate: bool) {
        self.add_offset_terminal(Terminal::Start, offset, intermediate);
    }

    /// Moves the end `offset` away from the maze, renaming the old end `exit`.
    pub fn add_offset_end_node(&mut self, offset: Float3, intermediate: bool) {
        self.add_offset_terminal(Terminal::End, offset, intermediate);
    }

    pub fn add_offset_start_and_end_nodes(&mut self, offset: Float3, intermediate: bool) {
        self.add_offset_start_node(offset, intermediate);
        self.add_offset_end_node(offset, intermediate);
    }

    fn add_offset_terminal(&mut self, which: Terminal, offset: Float3, intermediate: bool) {
        let (anchor, name, renamed, interim, direction) = match which {
            Terminal::Start => (self.start, "start", "entry", "interim-start", -1.0),
            Terminal::End => (self.end, "end", "exit", "interim-end", 1.0),
        };
        let origin = self.nodes[anchor.0].position;
        let indices = self.nodes[anchor.0].path_indices.clone();
        self.rename(anchor, renamed);

        let mut run = vec![anchor];
        if intermediate {
            run.push(self.push_node(origin + offset * (0.5 * direction), interim));
        }
        let terminal = self.push_node(origin + offset * direction, name);
        run.push(terminal);

        for pair in run.windows(2) {
            link_base(&mut self.nodes, pair[0], pair[1]);
            link_connected(&mut self.nodes, pair[0], pair[1]);
        }
        for &id in &run[1..] {
            self.nodes[id.0].path_indices = indices.clone();
        }
        let hops = run.len() - 1;
        for index in &indices {
            if let Some(length) = self.path_lengths.get_mut(index) {
                *length += hops;
            }
        }

        match which {
            Terminal::Start => self.start = terminal,
            Terminal::End => self.end = terminal,
        }
        run.reverse();
        self.splice_segment_run(run);
        self.resort();
    }

    fn push_node(&mut self, position: Float3, identifier: &str) -> NodeId {
        self.nodes.push(MazeNode::new(position, identifier));
        NodeId(self.nodes.len() - 1)
    }
}

//! Combining generated mazes into larger ones.
//!
//! All operations consume their inputs and return a new graph.

use super::{link_base, link_connected, MazeGraph, MazeNode, NodeId};
use crate::error::{MazeError, Result};
use crate::geom::Float3;
use log::debug;
use std::collections::BTreeMap;

impl MazeGraph {
    /// Joins the end of `first` to the start of `second` along `axis`.
    ///
    /// `second` is moved by `(offset + first.end + |second.start|) * axis`
    /// and its identifiers are prefixed with the rounded sum of that shift.
    /// A connector node sits between the two former terminals.
    pub fn concatenate(
        mut first: MazeGraph,
        mut second: MazeGraph,
        offset: Float3,
        axis: Float3,
    ) -> Result<MazeGraph> {
        require_same_indices(&first, &second)?;

        let shift = (offset + first.end_node().position + second.start_node().position.abs())
            .scale(axis);
        second.translate(shift);
        second.prefix_identifiers(&format!("{}-", shift.component_sum().round() as i64));
        second.rename(second.end, "end");
        let first_end = first.end;
        first.rename(first_end, first.end_node().position.to_string());

        let scale = (first.scale + second.scale) / 2.0;
        let joined_at = second.start;
        let combined = join(first, second, joined_at, scale);
        debug!(
            "concatenated mazes into {} nodes, path lengths {:?}",
            combined.node_count(),
            combined.path_lengths
        );
        Ok(combined)
    }

    /// Folds [`MazeGraph::concatenate`] over a list.
    pub fn concatenate_all(graphs: Vec<MazeGraph>, offset: Float3, axis: Float3) -> Result<MazeGraph> {
        let mut iter = graphs.into_iter();
        let first = iter.next().ok_or(MazeError::EmptyComposition)?;
        iter.try_fold(first, |acc, next| Self::concatenate(acc, next, offset, axis))
    }

    /// Shrinks `second` by `factor`, centres it on `first` and joins the end
    /// of `first` to whichever terminal of `second` is closer. The other
    /// terminal becomes the combined end.
    pub fn combine_shrink(mut first: MazeGraph, mut second: MazeGraph, factor: f32) -> Result<MazeGraph> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(MazeError::InvalidShrinkFactor(factor));
        }
        require_same_indices(&first, &second)?;

        second.apply_scale(factor);
        second.prefix_identifiers(&format!("{factor}-"));
        second.translate(first.center() - second.center());

        let anchor = first.end_node().position;
        let (near, far) = if anchor.distance(second.end_node().position)
            < anchor.distance(second.start_node().position)
        {
            (second.end, second.start)
        } else {
            (second.start, second.end)
        };
        let near_name = second.position(near).to_string();
        second.rename(near, near_name);
        second.rename(far, "end");
        second.start = near;
        second.end = far;
        let first_end = first.end;
        first.rename(first_end, first.end_node().position.to_string());

        let scale = (first.scale + second.scale) / 2.0;
        let combined = join(first, second, near, scale);
        debug!(
            "shrink-combined mazes into {} nodes, path lengths {:?}",
            combined.node_count(),
            combined.path_lengths
        );
        Ok(combined)
    }

    /// Folds [`MazeGraph::combine_shrink`] over a list; the i-th graph is
    /// shrunk by `factor^i`.
    pub fn combine_shrink_all(graphs: Vec<MazeGraph>, factor: f32) -> Result<MazeGraph> {
        let mut iter = graphs.into_iter().enumerate();
        let (_, first) = iter.next().ok_or(MazeError::EmptyComposition)?;
        iter.try_fold(first, |acc, (i, next)| {
            Self::combine_shrink(acc, next, factor.powi(i as i32))
        })
    }

    /// Unions two mazes carved over the same topology.
    ///
    /// Carved connections and labels are combined node by node; the
    /// shortest-path indices of the two graphs must be disjoint.
    pub fn merge(mut first: MazeGraph, second: MazeGraph) -> Result<MazeGraph> {
        if !first.scale.approx_eq(second.scale) {
            return Err(MazeError::ScaleMismatch);
        }
        if let Some(&index) = first
            .path_lengths
            .keys()
            .find(|k| second.path_lengths.contains_key(k))
        {
            return Err(MazeError::DuplicatePathIndex(index));
        }
        if first.node_count() != second.node_count() {
            return Err(MazeError::TopologyMismatch(format!(
                "{} nodes vs {}",
                first.node_count(),
                second.node_count()
            )));
        }

        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            if a.identifier != b.identifier {
                return Err(MazeError::TopologyMismatch(format!(
                    "'{}' vs '{}'",
                    a.identifier, b.identifier
                )));
            }
            if let Some(nb) = b.all_neighbors.iter().find(|nb| !a.all_neighbors.contains(nb)) {
                return Err(MazeError::TopologyMismatch(format!(
                    "'{}' has no possible link to '{}'",
                    a.identifier, second.nodes[nb.0].identifier
                )));
            }
        }

        for (i, other) in second.nodes.iter().enumerate() {
            let id = NodeId(i);
            first.nodes[i].absorb_labels(other);
            for &nb in &other.connected_neighbors {
                link_connected(&mut first.nodes, id, nb);
            }
        }
        first.path_lengths.extend(second.path_lengths);
        first.path_segments = match (first.path_segments.take(), second.path_segments) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend(theirs);
                Some(mine)
            }
            _ => None,
        };

        debug!("merged mazes, path indices {:?}", first.path_indices());
        Ok(first)
    }

    /// Folds [`MazeGraph::merge`] over a list.
    pub fn merge_all(graphs: Vec<MazeGraph>) -> Result<MazeGraph> {
        let mut iter = graphs.into_iter();
        let first = iter.next().ok_or(MazeError::EmptyComposition)?;
        iter.try_fold(first, Self::merge)
    }
}

fn require_same_indices(first: &MazeGraph, second: &MazeGraph) -> Result<()> {
    let a = first.path_indices();
    let b = second.path_indices();
    if a != b {
        return Err(MazeError::PathIndexMismatch { first: a, second: b });
    }
    Ok(())
}

/// Places `second` after `first` in one arena and links the end of `first`
/// to `joined_at` through a new connector node.
fn join(first: MazeGraph, second: MazeGraph, joined_at: NodeId, scale: Float3) -> MazeGraph {
    let base = first.nodes.len() + 1;
    let first_end = first.end;
    let shift = |id: NodeId| NodeId(id.0 + base);

    let connector = {
        let a = &first.nodes[first_end.0];
        let b = &second.nodes[joined_at.0];
        let mut node = MazeNode::new(
            a.position + (b.position - a.position) / 2.0,
            format!("conn-{}-{}", a.identifier, b.identifier),
        );
        node.on_dead_end = a.on_dead_end || b.on_dead_end;
        node.on_loop = a.on_loop || b.on_loop;
        node.not_connected_to_path = a.not_connected_to_path && b.not_connected_to_path;
        node.path_indices = a.path_indices.union(&b.path_indices).copied().collect();
        node
    };

    let mut path_lengths = BTreeMap::new();
    for (&index, &length) in &first.path_lengths {
        let theirs = second.path_lengths.get(&index).copied().unwrap_or_default();
        path_lengths.insert(index, length + theirs + 2);
    }

    let path_segments = match (first.path_segments, second.path_segments) {
        (Some(mut mine), Some(theirs)) => {
            mine.extend(
                theirs
                    .into_iter()
                    .map(|segment| segment.into_iter().map(shift).collect::<Vec<_>>()),
            );
            Some(mine)
        }
        _ => None,
    };

    let mut nodes = first.nodes;
    nodes.push(connector);
    nodes.extend(second.nodes.into_iter().map(|mut node| {
        for nb in node.all_neighbors.iter_mut().chain(node.connected_neighbors.iter_mut()) {
            *nb = shift(*nb);
        }
        node
    }));

    let conn = NodeId(base - 1);
    let far = shift(joined_at);
    for other in [first_end, far] {
        link_base(&mut nodes, conn, other);
        link_connected(&mut nodes, conn, other);
    }

    let mut combined = MazeGraph {
        nodes,
        start: first.start,
        end: shift(second.end),
        scale,
        path_lengths,
        min_path_length: first.min_path_length + second.min_path_length,
        max_path_length: first.max_path_length + second.max_path_length,
        quadrants: Vec::new(),
        path_segments,
    };
    combined.splice_segment_run(vec![first_end, conn, far]);
    combined.resort();
    combined
}

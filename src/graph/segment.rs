//! Decomposition of a carved maze into path segments.
//!
//! A path segment runs from a junction, dead end or loop anchor to the next
//! one; every interior node has exactly two connections.

use super::{MazeGraph, NodeId};
use crate::error::{MazeError, Result};
use log::{debug, trace};
use std::collections::BTreeSet;

impl MazeGraph {
    /// Computes the path segments of the carved maze. Can only run once.
    pub fn add_path_segments(&mut self) -> Result<()> {
        if self.path_segments.is_some() {
            return Err(MazeError::SegmentsAlreadyComputed);
        }
        let segments = Segmenter::new(self).run()?;
        debug!("split maze into {} path segments", segments.len());
        self.path_segments = Some(segments);
        Ok(())
    }

    /// Adds a freshly connected run of nodes to existing segments.
    ///
    /// The run's endpoints are anchors: a segment passing through an anchor
    /// that no longer has two connections is split there, and an anchor left
    /// with exactly two connections joins the two segments ending on it.
    pub(crate) fn splice_segment_run(&mut self, run: Vec<NodeId>) {
        let (Some(&first), Some(&last)) = (run.first(), run.last()) else {
            return;
        };
        let Some(segments) = self.path_segments.as_mut() else {
            return;
        };
        segments.push(run);

        let anchors: Vec<NodeId> = if first == last { vec![first] } else { vec![first, last] };
        for &anchor in &anchors {
            if self.nodes[anchor.0].connection_count() != 2 {
                split_at(segments, anchor);
            }
        }
        for &anchor in &anchors {
            if self.nodes[anchor.0].connection_count() == 2 {
                fuse_at(segments, anchor);
            }
        }
    }
}

fn split_at(segments: &mut Vec<Vec<NodeId>>, anchor: NodeId) {
    let mut i = 0;
    while i < segments.len() {
        let interior = segments[i].len() > 2
            && segments[i][1..segments[i].len() - 1].contains(&anchor);
        if interior {
            let segment = segments.remove(i);
            let cut = segment[1..].iter().position(|&n| n == anchor).map_or(0, |p| p + 1);
            segments.push(segment[..=cut].to_vec());
            segments.push(segment[cut..].to_vec());
        } else {
            i += 1;
        }
    }
}

fn fuse_at(segments: &mut Vec<Vec<NodeId>>, anchor: NodeId) {
    let touching: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            let open = s.first() != s.last();
            open && (s.first() == Some(&anchor) || s.last() == Some(&anchor))
        })
        .map(|(i, _)| i)
        .collect();
    let [a, b] = touching[..] else {
        return;
    };

    let mut tail = segments.remove(b);
    let mut head = segments.remove(a);
    if head.first() == Some(&anchor) {
        head.reverse();
    }
    if tail.last() == Some(&anchor) {
        tail.reverse();
    }
    head.extend_from_slice(&tail[1..]);
    segments.insert(a, head);
}

/// Walks the carved graph once, collecting runs between anchors.
///
/// `queue` accumulates the run being built. `searching` records the 2-way
/// nodes crossed while looking for an anchor to start a run from.
struct Segmenter<'a> {
    graph: &'a MazeGraph,
    completed: Vec<bool>,
    not_completed: BTreeSet<NodeId>,
    queue: Vec<NodeId>,
    searching: Vec<NodeId>,
    segments: Vec<Vec<NodeId>>,
}

impl<'a> Segmenter<'a> {
    fn new(graph: &'a MazeGraph) -> Self {
        let not_completed: BTreeSet<NodeId> = graph.connected_active_ids().into_iter().collect();
        let completed = graph.ids().map(|id| !not_completed.contains(&id)).collect();
        Self {
            graph,
            completed,
            not_completed,
            queue: Vec::new(),
            searching: Vec::new(),
            segments: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Vec<NodeId>>> {
        let n = self.graph.node_count();
        let mut current = self.graph.start();
        let mut count = 0usize;

        while !self.not_completed.is_empty() {
            let neighbors: Vec<NodeId> = self.graph.active_connections(current).collect();
            current = match neighbors.len() {
                0 => {
                    self.complete(current);
                    self.jump(current)
                }
                1 => self.dead_end(current, neighbors[0]),
                2 => self.pass_through(current, [neighbors[0], neighbors[1]])?,
                _ => self.junction(current, &neighbors),
            };

            count += 1;
            if self.queue.len() > n || count > n * n {
                trace!("segmenter stuck at {current} with queue {:?}", self.queue);
                return Err(MazeError::NonTermination {
                    stage: "path segmentation",
                });
            }
        }
        Ok(self.segments)
    }

    fn complete(&mut self, id: NodeId) {
        self.completed[id.0] = true;
        self.not_completed.remove(&id);
    }

    fn jump(&self, fallback: NodeId) -> NodeId {
        self.not_completed.first().copied().unwrap_or(fallback)
    }

    fn emit(&mut self) {
        self.segments.push(std::mem::take(&mut self.queue));
    }

    fn dead_end(&mut self, current: NodeId, neighbor: NodeId) -> NodeId {
        self.complete(current);
        if self.queue.is_empty() {
            self.searching.clear();
            self.queue.push(current);
            neighbor
        } else {
            self.queue.push(current);
            self.emit();
            self.jump(current)
        }
    }

    fn pass_through(&mut self, current: NodeId, neighbors: [NodeId; 2]) -> Result<NodeId> {
        if self.queue.is_empty() {
            self.searching.push(current);
            let seen = neighbors.map(|nb| self.searching.contains(&nb));
            return match seen {
                [true, true] => self.close_cycle(current),
                [true, false] => Ok(neighbors[1]),
                _ => Ok(neighbors[0]),
            };
        }

        self.queue.push(current);
        self.complete(current);
        let queued = neighbors.map(|nb| self.queue.contains(&nb));
        match queued {
            [true, true] => {
                let origin = self.queue[0];
                if !neighbors.contains(&origin) {
                    return Err(MazeError::NonTermination {
                        stage: "path segmentation",
                    });
                }
                // back at the anchor the run started from
                self.queue.push(origin);
                self.emit();
                Ok(self.jump(current))
            }
            [true, false] => Ok(neighbors[1]),
            _ => Ok(neighbors[0]),
        }
    }

    /// A search that returns to its first node crossed a component made only
    /// of 2-way nodes; it becomes one closed segment.
    fn close_cycle(&mut self, current: NodeId) -> Result<NodeId> {
        let origin = self.searching[0];
        let closes = self
            .graph
            .active_connections(current)
            .any(|nb| nb == origin);
        if !closes || self.searching.len() < 3 {
            return Err(MazeError::NonTermination {
                stage: "path segmentation",
            });
        }
        let mut cycle = std::mem::take(&mut self.searching);
        for &id in &cycle {
            self.complete(id);
        }
        cycle.push(origin);
        self.segments.push(cycle);
        Ok(self.jump(current))
    }

    fn junction(&mut self, current: NodeId, neighbors: &[NodeId]) -> NodeId {
        if !self.queue.is_empty() {
            self.queue.push(current);
            self.emit();
            return self.jump(current);
        }

        self.searching.clear();
        let uncompleted: Vec<NodeId> = neighbors
            .iter()
            .copied()
            .filter(|nb| !self.completed[nb.0])
            .collect();

        if let Some(&next) = uncompleted
            .iter()
            .find(|&&nb| self.graph.active_connection_count(nb) < 3)
        {
            self.queue.push(current);
            return next;
        }

        self.complete(current);
        for nb in uncompleted {
            self.segments.push(vec![current, nb]);
        }
        self.jump(current)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::graph_from_edges;
    use super::*;

    fn names(graph: &MazeGraph, segment: &[NodeId]) -> Vec<String> {
        segment
            .iter()
            .map(|&id| graph.node(id).identifier.clone())
            .collect()
    }

    /// Segments as identifier lists in a canonical direction, sorted.
    fn canonical(graph: &MazeGraph) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = graph
            .path_segments()
            .unwrap()
            .iter()
            .map(|s| {
                let forward = names(graph, s);
                let mut backward = forward.clone();
                backward.reverse();
                forward.min(backward)
            })
            .collect();
        out.sort();
        out
    }

    fn assert_covers(graph: &MazeGraph) {
        let segments = graph.path_segments().unwrap();
        let mut covered = BTreeSet::new();
        for segment in segments {
            for (i, &id) in segment.iter().enumerate() {
                covered.insert(id);
                if i > 0 && i + 1 < segment.len() {
                    assert_eq!(graph.node(id).connection_count(), 2);
                }
            }
        }
        let expected: BTreeSet<NodeId> = graph.connected_active_ids().into_iter().collect();
        assert_eq!(covered, expected);
    }

    #[test]
    fn test_straight_corridor_is_one_segment() {
        let mut graph = graph_from_edges(
            &["start", "a", "b", "end"],
            &[("start", "a"), ("a", "b"), ("b", "end")],
            None,
        );
        graph.add_path_segments().unwrap();
        assert_eq!(canonical(&graph), vec![vec!["end", "b", "a", "start"]]);
        assert_covers(&graph);
    }

    #[test]
    fn test_junction_splits_runs() {
        let mut graph = graph_from_edges(
            &["start", "j", "a", "end", "d"],
            &[("start", "j"), ("j", "a"), ("a", "end"), ("j", "d")],
            None,
        );
        graph.add_path_segments().unwrap();
        assert_eq!(
            canonical(&graph),
            vec![
                vec!["d", "j"],
                vec!["end", "a", "j"],
                vec!["j", "start"],
            ]
        );
        assert_covers(&graph);
    }

    #[test]
    fn test_loop_closes_on_its_junction() {
        let mut graph = graph_from_edges(
            &["start", "j", "x", "y", "end"],
            &[
                ("start", "j"),
                ("j", "x"),
                ("x", "y"),
                ("y", "j"),
                ("j", "end"),
            ],
            None,
        );
        graph.add_path_segments().unwrap();
        assert_eq!(
            canonical(&graph),
            vec![
                vec!["end", "j"],
                vec!["j", "start"],
                vec!["j", "x", "y", "j"],
            ]
        );
        assert_covers(&graph);
    }

    #[test]
    fn test_adjacent_junctions_get_short_segment() {
        let mut graph = graph_from_edges(
            &["start", "j1", "j2", "a", "b", "end"],
            &[
                ("start", "j1"),
                ("j1", "j2"),
                ("j1", "a"),
                ("j2", "b"),
                ("j2", "end"),
            ],
            None,
        );
        graph.add_path_segments().unwrap();
        assert!(canonical(&graph).contains(&vec!["j1".to_string(), "j2".to_string()]));
        assert_eq!(graph.path_segments().unwrap().len(), 5);
        assert_covers(&graph);
    }

    #[test]
    fn test_pure_cycle_is_one_closed_segment() {
        let mut graph = graph_from_edges(
            &["start", "a", "b", "end"],
            &[("start", "a"), ("a", "b"), ("b", "end"), ("end", "start")],
            None,
        );
        graph.add_path_segments().unwrap();
        let segments = graph.path_segments().unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 5);
        assert_eq!(segments[0].first(), segments[0].last());
        assert_covers(&graph);
    }

    #[test]
    fn test_segments_only_once() {
        let mut graph = graph_from_edges(&["start", "end"], &[("start", "end")], None);
        graph.add_path_segments().unwrap();
        assert!(matches!(
            graph.add_path_segments(),
            Err(MazeError::SegmentsAlreadyComputed)
        ));
    }

    #[test]
    fn test_inactive_nodes_are_skipped() {
        let mut graph = graph_from_edges(
            &["start", "j", "a", "end", "d"],
            &[("start", "j"), ("j", "a"), ("a", "end"), ("j", "d")],
            None,
        );
        let d = graph.find("d").unwrap();
        graph.node_mut(d).active = false;
        graph.add_path_segments().unwrap();
        assert_eq!(canonical(&graph), vec![vec!["end", "a", "j", "start"]]);
    }

    #[test]
    fn test_splice_fuses_through_former_dead_end() {
        let mut graph = graph_from_edges(
            &["start", "a", "end", "x"],
            &[("start", "a"), ("a", "end")],
            None,
        );
        graph.add_path_segments().unwrap();
        let end = graph.end();
        let x = graph.find("x").unwrap();
        graph.add_base_connection(end, x).unwrap();
        graph.connect(end, x).unwrap();
        graph.splice_segment_run(vec![end, x]);

        assert_eq!(canonical(&graph), vec![vec!["start", "a", "end", "x"]]);
    }

    #[test]
    fn test_splice_splits_at_new_junction() {
        let mut graph = graph_from_edges(
            &["start", "a", "end", "x"],
            &[("start", "a"), ("a", "end")],
            None,
        );
        graph.add_path_segments().unwrap();
        let a = graph.find("a").unwrap();
        let x = graph.find("x").unwrap();
        graph.add_base_connection(a, x).unwrap();
        graph.connect(a, x).unwrap();
        graph.splice_segment_run(vec![a, x]);

        assert_eq!(
            canonical(&graph),
            vec![vec!["a", "end"], vec!["a", "start"], vec!["a", "x"]]
        );
        assert_covers(&graph);
    }
}

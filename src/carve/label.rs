use super::require_active_terminals;
use crate::error::{MazeError, Result};
use crate::graph::{MazeGraph, NodeId};
use log::debug;

const STAGE: &str = "path labeling";

/// Labels the shortest start-end path over the active carved connections
/// and classifies every branch hanging off it.
///
/// Path nodes receive the lowest unused path index. Branches that only end
/// in dead ends are marked `on_dead_end`, branches that rejoin the path are
/// marked `on_loop`, and nodes adjacent to either become junctions of the
/// same kind. Active nodes left over are `not_connected_to_path`. Returns the
/// path index.
pub fn label_shortest_path(graph: &mut MazeGraph) -> Result<u32> {
    require_active_terminals(graph)?;
    let (start, end) = (graph.start(), graph.end());

    let distances = graph.bfs_distances(start);
    let length = distances[end.0].ok_or(MazeError::EndUnreachable)?;
    let on_path = backtrack_path(graph, &distances, start, end)?;

    let mut labels = Labels::new(graph.node_count());
    for seed in path_neighbors(graph, &on_path) {
        if labels.dead_end[seed.0] || labels.on_loop[seed.0] {
            continue;
        }
        label_branch(graph, &on_path, &mut labels, seed)?;
    }
    mark_junctions(graph, &on_path, &mut labels);

    let index = graph.next_path_index();
    for id in graph.ids().collect::<Vec<_>>() {
        let node = graph.node_mut(id);
        if !node.active {
            continue;
        }
        if on_path[id.0] {
            node.path_indices.insert(index);
        }
        node.on_dead_end = labels.dead_end[id.0];
        node.on_loop = labels.on_loop[id.0];
        node.not_connected_to_path =
            !on_path[id.0] && !labels.dead_end[id.0] && !labels.on_loop[id.0];
    }
    graph.set_path_length(index, length);

    debug!(
        "labeled path {} of length {} ({} dead-end, {} loop nodes)",
        index,
        length,
        labels.dead_end.iter().filter(|&&d| d).count(),
        labels.on_loop.iter().filter(|&&l| l).count()
    );
    Ok(index)
}

struct Labels {
    dead_end: Vec<bool>,
    on_loop: Vec<bool>,
}

impl Labels {
    fn new(count: usize) -> Self {
        Self {
            dead_end: vec![false; count],
            on_loop: vec![false; count],
        }
    }
}

/// Walks back from `end`, always to the first neighbour strictly closer to
/// `start`.
fn backtrack_path(
    graph: &MazeGraph,
    distances: &[Option<usize>],
    start: NodeId,
    end: NodeId,
) -> Result<Vec<bool>> {
    let mut on_path = vec![false; graph.node_count()];
    let mut current = end;
    on_path[current.0] = true;
    let mut count = 0;
    while current != start {
        let here = distances[current.0].unwrap_or(usize::MAX);
        current = graph
            .active_connections(current)
            .filter_map(|nb| distances[nb.0].map(|d| (d, nb)))
            .filter(|&(d, _)| d < here)
            .min_by_key(|&(d, _)| d)
            .map(|(_, nb)| nb)
            .ok_or(MazeError::NonTermination { stage: STAGE })?;
        on_path[current.0] = true;

        count += 1;
        if count > graph.node_count() {
            return Err(MazeError::NonTermination { stage: STAGE });
        }
    }
    Ok(on_path)
}

/// Active off-path nodes connected to the path.
fn path_neighbors(graph: &MazeGraph, on_path: &[bool]) -> Vec<NodeId> {
    graph
        .ids()
        .filter(|&id| graph.node(id).active && !on_path[id.0])
        .filter(|&id| graph.active_connections(id).any(|nb| on_path[nb.0]))
        .collect()
}

/// Depth-first search from `seed` that labels nodes on the way back out.
///
/// A node with one active connection is a dead end. Otherwise it is a loop
/// when a neighbour already is one, or when it touches the path. The seed
/// itself always touches the path once, so only a second contact counts
/// there.
fn label_branch(
    graph: &MazeGraph,
    on_path: &[bool],
    labels: &mut Labels,
    seed: NodeId,
) -> Result<()> {
    let limit = 2 * graph.node_count();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut on_stack = vec![false; graph.node_count()];
    let mut current = seed;
    let mut count = 0;

    loop {
        let mut path_contacts = 0;
        let mut has_loop = false;
        let mut next = None;
        for nb in graph.active_connections(current) {
            if on_path[nb.0] {
                path_contacts += 1;
            } else if labels.on_loop[nb.0] {
                has_loop = true;
            } else if labels.dead_end[nb.0] {
            } else if !on_stack[nb.0] && next.is_none() {
                next = Some(nb);
            }
        }
        let touches_path = if current == seed {
            path_contacts > 1
        } else {
            path_contacts > 0
        };

        if let Some(next) = next {
            stack.push(current);
            on_stack[current.0] = true;
            current = next;
        } else {
            if graph.active_connection_count(current) <= 1 {
                labels.dead_end[current.0] = true;
            } else if has_loop || (touches_path && current != seed) {
                labels.on_loop[current.0] = true;
            } else {
                labels.dead_end[current.0] = true;
            }

            match stack.pop() {
                Some(previous) => {
                    on_stack[previous.0] = false;
                    current = previous;
                }
                None => return Ok(()),
            }
        }

        count += 1;
        if count > limit {
            return Err(MazeError::NonTermination { stage: STAGE });
        }
    }
}

/// Nodes next to a dead end become dead-end junctions; path nodes next to a
/// loop become loop junctions.
fn mark_junctions(graph: &MazeGraph, on_path: &[bool], labels: &mut Labels) {
    let active: Vec<NodeId> = graph.ids().filter(|&id| graph.node(id).active).collect();
    let dead_end_junctions: Vec<NodeId> = active
        .iter()
        .copied()
        .filter(|&id| graph.active_connections(id).any(|nb| labels.dead_end[nb.0]))
        .collect();
    let loop_junctions: Vec<NodeId> = active
        .iter()
        .copied()
        .filter(|&id| on_path[id.0])
        .filter(|&id| graph.active_connections(id).any(|nb| labels.on_loop[nb.0]))
        .collect();
    for id in dead_end_junctions {
        labels.dead_end[id.0] = true;
    }
    for id in loop_junctions {
        labels.on_loop[id.0] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::graph_from_edges;

    fn flags(graph: &MazeGraph, name: &str) -> (bool, bool, bool, bool) {
        let node = graph.node(graph.find(name).unwrap());
        (
            node.on_shortest_path(),
            node.on_dead_end,
            node.on_loop,
            node.not_connected_to_path,
        )
    }

    #[test]
    fn test_straight_path() {
        let mut graph = graph_from_edges(
            &["start", "a", "b", "end"],
            &[("start", "a"), ("a", "b"), ("b", "end")],
            None,
        );
        assert_eq!(label_shortest_path(&mut graph).unwrap(), 0);
        assert_eq!(graph.path_lengths()[&0], 3);
        for name in ["start", "a", "b", "end"] {
            assert_eq!(flags(&graph, name), (true, false, false, false));
        }
    }

    #[test]
    fn test_dead_end_branch_and_junction() {
        // start - a - end with a two-node spur a - d1 - d2.
        let mut graph = graph_from_edges(
            &["start", "a", "end", "d1", "d2"],
            &[("start", "a"), ("a", "end"), ("a", "d1"), ("d1", "d2")],
            None,
        );
        label_shortest_path(&mut graph).unwrap();
        assert_eq!(flags(&graph, "d1"), (false, true, false, false));
        assert_eq!(flags(&graph, "d2"), (false, true, false, false));
        // The path node the spur hangs from is a dead-end junction.
        assert_eq!(flags(&graph, "a"), (true, true, false, false));
        assert_eq!(flags(&graph, "start"), (true, false, false, false));
    }

    #[test]
    fn test_loop_branch_rejoins_path() {
        // start - a - b - end with a detour a - l1 - l2 - b.
        let mut graph = graph_from_edges(
            &["start", "a", "b", "end", "l1", "l2"],
            &[
                ("start", "a"),
                ("a", "b"),
                ("b", "end"),
                ("a", "l1"),
                ("l1", "l2"),
                ("l2", "b"),
            ],
            None,
        );
        label_shortest_path(&mut graph).unwrap();
        assert_eq!(graph.path_lengths()[&0], 3);
        assert_eq!(flags(&graph, "l1"), (false, false, true, false));
        assert_eq!(flags(&graph, "l2"), (false, false, true, false));
        assert_eq!(flags(&graph, "a"), (true, false, true, false));
        assert_eq!(flags(&graph, "b"), (true, false, true, false));
    }

    #[test]
    fn test_seed_touching_path_twice_is_not_a_loop_by_itself() {
        // s sits between a and b on the path and nothing else, so it has two
        // path contacts but is the seed of its own search.
        let mut graph = graph_from_edges(
            &["start", "a", "b", "end", "s"],
            &[("start", "a"), ("a", "b"), ("b", "end"), ("a", "s"), ("s", "b")],
            None,
        );
        label_shortest_path(&mut graph).unwrap();
        assert_eq!(flags(&graph, "s"), (false, true, false, false));
    }

    #[test]
    fn test_unconnected_leftovers() {
        let mut graph = graph_from_edges(
            &["start", "end", "x", "y"],
            &[("start", "end"), ("x", "y")],
            None,
        );
        label_shortest_path(&mut graph).unwrap();
        assert_eq!(flags(&graph, "x"), (false, false, false, true));
        assert_eq!(flags(&graph, "y"), (false, false, false, true));
    }

    #[test]
    fn test_unreachable_end() {
        let mut graph = graph_from_edges(&["start", "a", "end"], &[("start", "a")], None);
        assert!(matches!(
            label_shortest_path(&mut graph),
            Err(MazeError::EndUnreachable)
        ));
    }

    #[test]
    fn test_second_path_takes_next_index() {
        let mut graph = graph_from_edges(&["start", "end"], &[("start", "end")], None);
        assert_eq!(label_shortest_path(&mut graph).unwrap(), 0);
        assert_eq!(label_shortest_path(&mut graph).unwrap(), 1);
        assert_eq!(graph.path_indices(), vec![0, 1]);
        let start = graph.start_node();
        assert!(start.path_indices.contains(&0) && start.path_indices.contains(&1));
    }
}

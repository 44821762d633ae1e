use super::{initial_visits, require_active_terminals, unvisited_neighbors};
use crate::error::{MazeError, Result};
use crate::graph::MazeGraph;
use log::trace;
use rand::Rng;

const STAGE: &str = "recursive backtracking";

/// Depth-first carve with an explicit stack: step to a random unvisited
/// neighbour while one exists, otherwise back up.
pub(crate) fn recursive_backtracking<R: Rng + ?Sized>(graph: &mut MazeGraph, rng: &mut R) -> Result<()> {
    require_active_terminals(graph)?;
    let limit = 2 * graph.node_count();
    let mut visited = initial_visits(graph);
    let mut stack = Vec::new();
    let mut current = graph.start();
    visited[current.0] = true;

    let mut steps = 0;
    loop {
        let unvisited = unvisited_neighbors(graph, current, &visited);
        if !unvisited.is_empty() {
            stack.push(current);
            let next = unvisited[rng.gen_range(0..unvisited.len())];
            graph.connect(current, next)?;
            visited[next.0] = true;
            current = next;
        } else if let Some(previous) = stack.pop() {
            current = previous;
        } else {
            break;
        }

        steps += 1;
        if steps > limit {
            trace!("backtracking stack depth {} at step {}", stack.len(), steps);
            return Err(MazeError::NonTermination { stage: STAGE });
        }
    }

    if visited.iter().any(|v| !v) {
        return Err(MazeError::NonTermination { stage: STAGE });
    }
    Ok(())
}

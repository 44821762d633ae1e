use super::{initial_visits, require_active_terminals, unvisited_neighbors};
use crate::error::{MazeError, Result};
use crate::geom::Float3;
use crate::graph::{MazeGraph, NodeId};
use log::trace;
use rand::Rng;
use std::collections::BTreeSet;

const STAGE: &str = "hunt and kill";

/// Consecutive connections after which a hunt may start. At least one, so a
/// hunt always has a carve to resume.
pub(crate) fn hunt_after_connections(segment_length: f32, scale: Float3) -> usize {
    let step = scale.component_min();
    if step.is_nan() || step <= 0.0 || !segment_length.is_finite() {
        return usize::MAX;
    }
    ((segment_length / step).round() as usize).max(1)
}

/// Depth-first carve that, once a run reaches the hunt length, jumps with
/// `hunt_probability` to a random earlier node that still has unvisited
/// neighbours instead of continuing the run.
pub(crate) fn hunt_and_kill<R: Rng + ?Sized>(
    graph: &mut MazeGraph,
    hunt_after_segment_length: f32,
    hunt_probability: f64,
    rng: &mut R,
) -> Result<()> {
    require_active_terminals(graph)?;
    let n = graph.node_count();
    let hunt_after = hunt_after_connections(hunt_after_segment_length, graph.scale());

    let mut visited = initial_visits(graph);
    let mut current = graph.start();
    visited[current.0] = true;
    let mut remaining = visited.iter().filter(|v| !**v).count();
    let mut targets = vec![current];
    let mut connections = 0;
    let mut count = 0;

    while remaining > 0 {
        let unvisited = unvisited_neighbors(graph, current, &visited);
        if connections >= hunt_after && rng.gen::<f64>() >= hunt_probability {
            connections = 0;
        }

        if !unvisited.is_empty() && connections < hunt_after {
            let next = unvisited[rng.gen_range(0..unvisited.len())];
            graph.connect(current, next)?;
            visited[next.0] = true;
            remaining -= 1;
            targets.push(next);
            current = next;
            connections += 1;
        } else {
            current = hunt(graph, &mut targets, &visited, rng)?;
            connections = 0;
        }

        count += 1;
        if targets.is_empty() || count > n * n {
            return Err(MazeError::NonTermination { stage: STAGE });
        }
    }
    Ok(())
}

/// Picks random carved nodes until one with unvisited neighbours turns up.
/// Exhausted nodes are dropped from `targets`.
fn hunt<R: Rng + ?Sized>(
    graph: &MazeGraph,
    targets: &mut Vec<NodeId>,
    visited: &[bool],
    rng: &mut R,
) -> Result<NodeId> {
    let mut candidates: Vec<usize> = (0..targets.len()).collect();
    let mut exhausted = BTreeSet::new();
    let mut tries = 0;
    let found = loop {
        if candidates.is_empty() {
            trace!("hunt ran out of {} targets", targets.len());
            return Err(MazeError::NonTermination { stage: STAGE });
        }
        let pick = rng.gen_range(0..candidates.len());
        let target = targets[candidates[pick]];
        if unvisited_neighbors(graph, target, visited).is_empty() {
            candidates.remove(pick);
            exhausted.insert(target);
        } else {
            break target;
        }

        tries += 1;
        if tries > targets.len() {
            return Err(MazeError::NonTermination { stage: STAGE });
        }
    };
    targets.retain(|t| !exhausted.contains(t));
    Ok(found)
}

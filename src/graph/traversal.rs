use super::{MazeGraph, NodeId};
use std::collections::VecDeque;

impl MazeGraph {
    /// Active connected neighbours of a node.
    pub fn active_connections(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .connected_neighbors()
            .iter()
            .copied()
            .filter(|&n| self.node(n).active)
    }

    pub fn active_connection_count(&self, id: NodeId) -> usize {
        self.active_connections(id).count()
    }

    /// Active nodes with at least one carved connection.
    pub fn connected_active_ids(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.node(id).active && self.node(id).connection_count() > 0)
            .collect()
    }

    /// Every active node reachable from `from` over carved connections,
    /// in breadth-first order.
    pub fn reachable_from(&self, from: NodeId) -> Vec<NodeId> {
        let distances = self.bfs_distances(from);
        let mut reached: Vec<(usize, NodeId)> = distances
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.map(|d| (d, NodeId(i))))
            .collect();
        reached.sort();
        reached.into_iter().map(|(_, id)| id).collect()
    }

    /// Hop counts from `from` over active carved connections; `None` marks
    /// unreachable or inactive nodes.
    pub fn bfs_distances(&self, from: NodeId) -> Vec<Option<usize>> {
        let mut distances = vec![None; self.node_count()];
        if !self.node(from).active {
            return distances;
        }
        distances[from.0] = Some(0);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            let next = distances[current.0].unwrap_or_default() + 1;
            for nb in self.active_connections(current) {
                if distances[nb.0].is_none() {
                    distances[nb.0] = Some(next);
                    queue.push_back(nb);
                }
            }
        }
        distances
    }

    /// Hop count of the shortest carved route between two nodes.
    pub fn shortest_distance(&self, from: NodeId, to: NodeId) -> Option<usize> {
        self.bfs_distances(from)[to.0]
    }

    /// True when both adjacency layers are symmetric and every carved
    /// connection is also a topology link.
    pub fn is_consistent(&self) -> bool {
        self.ids().all(|id| {
            let node = self.node(id);
            let base_ok = node
                .all_neighbors()
                .iter()
                .all(|&nb| self.node(nb).all_neighbors().contains(&id));
            let carved_ok = node.connected_neighbors().iter().all(|&nb| {
                self.node(nb).connected_neighbors().contains(&id)
                    && node.all_neighbors().contains(&nb)
            });
            base_ok && carved_ok
        })
    }
}

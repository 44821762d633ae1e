use super::MazeGraph;
use crate::error::{MazeError, Result};
use crate::geom::binomial_coefficient;
use std::collections::BTreeMap;

impl MazeGraph {
    /// Number of carved connections; each link is counted once.
    pub fn number_of_connections(&self) -> usize {
        let ends: usize = self.nodes.iter().map(|n| n.connection_count()).sum();
        ends / 2
    }

    /// Sum over nodes of the distinct pairs among their connections.
    pub fn number_of_unique_pairwise_connections(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| binomial_coefficient(n.connection_count(), 2))
            .sum()
    }

    /// Normalised difficulty of every shortest path:
    /// `(length - min_path_length) / node_count`, where the node count is the
    /// quadrant's when one is given.
    pub fn difficulty(&self, quadrant: Option<usize>) -> Result<BTreeMap<u32, f32>> {
        let max_len = match quadrant {
            Some(index) => self
                .quadrants
                .get(index)
                .ok_or(MazeError::QuadrantOutOfRange {
                    index,
                    count: self.quadrants.len(),
                })?
                .len(),
            None => self.nodes.len(),
        };
        Ok(self
            .path_lengths
            .iter()
            .map(|(&index, &length)| {
                let excess = length as f32 - self.min_path_length as f32;
                (index, excess / max_len as f32)
            })
            .collect())
    }

    /// Junctions (three or more connections) on each shortest path.
    pub fn intersections_on_path(&self) -> BTreeMap<u32, usize> {
        self.path_lengths
            .keys()
            .map(|&index| {
                let count = self
                    .nodes
                    .iter()
                    .filter(|n| n.path_indices.contains(&index) && n.is_junction())
                    .count();
                (index, count)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::graph_from_edges;
    use super::*;
    use approx::assert_relative_eq;

    fn star() -> MazeGraph {
        let mut graph = graph_from_edges(
            &["start", "j", "a", "b", "end"],
            &[("start", "j"), ("j", "a"), ("j", "b"), ("j", "end")],
            None,
        );
        for name in ["start", "j", "end"] {
            let id = graph.find(name).unwrap();
            graph.node_mut(id).path_indices.insert(0);
        }
        graph.set_path_length(0, 2);
        graph
    }

    #[test]
    fn test_connection_counts() {
        let graph = star();
        assert_eq!(graph.number_of_connections(), 4);
        // hub has C(4, 2) pairs, leaves none
        assert_eq!(graph.number_of_unique_pairwise_connections(), 6);
    }

    #[test]
    fn test_difficulty_over_whole_graph() {
        let graph = star();
        let difficulty = graph.difficulty(None).unwrap();
        // (2 - 1) / 5
        assert_relative_eq!(difficulty[&0], 0.2, epsilon = 1e-6);
        assert!(matches!(
            graph.difficulty(Some(0)),
            Err(MazeError::QuadrantOutOfRange { index: 0, count: 0 })
        ));
    }

    #[test]
    fn test_intersections_on_path() {
        let graph = star();
        assert_eq!(graph.intersections_on_path()[&0], 1);
    }
}

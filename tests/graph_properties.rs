use mazecore::{CarveAlgorithm, Float3, GridTopology, MazeConfig, MazeGenerator, MazeGraph, NodeId};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn carved(x: usize, y: usize, z: usize, seed: u64, hunt: bool) -> MazeGraph {
    let carve = if hunt {
        CarveAlgorithm::HuntAndKill {
            hunt_after_segment_length: 2.0,
            hunt_probability: 0.5,
        }
    } else {
        CarveAlgorithm::RecursiveBacktracking
    };
    let config = MazeConfig::new(Float3::ONE, seed)
        .with_jitter(0.2)
        .with_carve(carve);
    MazeGenerator::new(GridTopology::new(x, y, z), config)
        .generate()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn carved_grid_is_symmetric_and_spanning(
        x in 1usize..6, y in 1usize..3, z in 2usize..6, seed in any::<u64>(), hunt in any::<bool>()
    ) {
        let graph = carved(x, y, z, seed, hunt);
        prop_assert!(graph.is_consistent());
        prop_assert_eq!(graph.reachable_from(graph.start()).len(), graph.node_count());
        prop_assert_eq!(graph.number_of_connections(), graph.node_count() - 1);
    }

    #[test]
    fn labeled_path_is_a_shortest_simple_path(
        x in 1usize..6, z in 2usize..6, seed in any::<u64>(), hunt in any::<bool>()
    ) {
        let graph = carved(x, 1, z, seed, hunt);
        let length = graph.path_lengths()[&0];
        prop_assert_eq!(graph.shortest_distance(graph.start(), graph.end()), Some(length));
        let on_path = graph.nodes().iter().filter(|n| n.on_shortest_path()).count();
        prop_assert_eq!(on_path, length + 1);
    }

    #[test]
    fn every_connected_node_gets_a_label(
        x in 1usize..6, z in 2usize..6, seed in any::<u64>(), hunt in any::<bool>()
    ) {
        let graph = carved(x, 1, z, seed, hunt);
        for node in graph.nodes().iter().filter(|n| n.connection_count() > 0) {
            let labeled = node.on_shortest_path()
                || node.on_dead_end
                || node.on_loop
                || node.not_connected_to_path;
            prop_assert!(labeled, "{} has no label", node.identifier);
            if !node.is_junction() {
                prop_assert!(!(node.on_dead_end && node.on_loop));
            }
        }
    }

    #[test]
    fn path_segments_cover_the_maze(
        x in 1usize..6, z in 2usize..6, seed in any::<u64>(), hunt in any::<bool>()
    ) {
        let mut graph = carved(x, 1, z, seed, hunt);
        graph.add_path_segments().unwrap();
        let segments = graph.path_segments().unwrap();

        let covered: BTreeSet<NodeId> = segments.iter().flatten().copied().collect();
        let connected: BTreeSet<NodeId> = graph.connected_active_ids().into_iter().collect();
        prop_assert_eq!(covered, connected);

        for segment in segments.iter().filter(|s| s.len() > 2) {
            for &id in &segment[1..segment.len() - 1] {
                prop_assert_eq!(graph.node(id).connection_count(), 2);
            }
        }
    }
}

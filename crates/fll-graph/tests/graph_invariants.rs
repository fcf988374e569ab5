use fll_core::{FllError, NodeId};
use fll_graph::{degree_histogram, degree_stats, Graph};

fn node(raw: u64) -> NodeId {
    NodeId::from_raw(raw)
}

#[test]
fn repeated_pairs_increment_weight() {
    let mut graph = Graph::with_nodes(3);
    assert_eq!(graph.add_edge(node(0), node(1)).unwrap(), 1);
    assert_eq!(graph.add_edge(node(1), node(0)).unwrap(), 2);
    graph.add_edge(node(1), node(2)).unwrap();

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.total_weight(), 3);
    assert_eq!(graph.weight(node(0), node(1)), Some(2));
    assert_eq!(graph.degrees(), &[2, 3, 1]);
    graph.check_invariants().unwrap();
}

#[test]
fn self_loops_and_unknown_nodes_are_rejected() {
    let mut graph = Graph::with_nodes(2);
    let err = graph.add_edge(node(1), node(1)).unwrap_err();
    assert!(matches!(err, FllError::Graph(ref info) if info.code == "self-loop"));

    let err = graph.add_edge(node(0), node(5)).unwrap_err();
    assert_eq!(err.info().code, "unknown-node");

    let err = graph.add_weighted_edge(node(0), node(1), 0).unwrap_err();
    assert_eq!(err.info().code, "zero-weight");
    assert_eq!(graph.total_weight(), 0);
}

#[test]
fn degree_statistics_follow_the_degree_sequence() {
    let mut graph = Graph::with_nodes(4);
    graph.add_edge(node(0), node(1)).unwrap();
    graph.add_edge(node(0), node(2)).unwrap();
    graph.add_edge(node(0), node(3)).unwrap();

    let histogram = degree_histogram(&graph);
    assert_eq!(histogram.get(&1), Some(&3));
    assert_eq!(histogram.get(&3), Some(&1));

    let stats = degree_stats(&graph);
    assert_eq!(stats.min, 1);
    assert_eq!(stats.max, 3);
    assert!((stats.mean - 1.5).abs() < 1e-12);

    let empty = degree_stats(&Graph::new());
    assert_eq!(empty.max, 0);
    assert_eq!(empty.mean, 0.0);
}

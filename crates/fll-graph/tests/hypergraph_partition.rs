use fll_core::NodeId;
use fll_graph::{hyperedge_size_histogram, Hypergraph};

fn node(raw: u64) -> NodeId {
    NodeId::from_raw(raw)
}

#[test]
fn repeated_members_count_towards_degree() {
    let mut hypergraph = Hypergraph::new();
    for _ in 0..3 {
        hypergraph.add_node().unwrap();
    }
    hypergraph.add_hyperedge(vec![node(0), node(1), node(1)]).unwrap();
    hypergraph.add_hyperedge(vec![node(2), node(0)]).unwrap();

    assert_eq!(hypergraph.degrees(), &[2, 2, 1]);
    assert_eq!(hypergraph.edge_count(), 2);
    hypergraph.check_invariants().unwrap();

    let sizes = hyperedge_size_histogram(&hypergraph);
    assert_eq!(sizes.get(&3), Some(&1));
    assert_eq!(sizes.get(&2), Some(&1));
}

#[test]
fn empty_and_dangling_hyperedges_are_rejected() {
    let mut hypergraph = Hypergraph::new();
    hypergraph.add_node().unwrap();
    assert_eq!(
        hypergraph.add_hyperedge(Vec::new()).unwrap_err().info().code,
        "empty-hyperedge"
    );
    assert_eq!(
        hypergraph.add_hyperedge(vec![node(0), node(4)]).unwrap_err().info().code,
        "unknown-node"
    );
    assert_eq!(hypergraph.degrees(), &[0]);
}

#[test]
fn community_incidence_tracks_member_degrees() {
    let mut hypergraph = Hypergraph::with_communities(2);
    assert!(hypergraph.add_node().is_err());
    let a = hypergraph.add_node_in(0).unwrap();
    let b = hypergraph.add_node_in(1).unwrap();
    let c = hypergraph.add_node_in(0).unwrap();
    assert!(hypergraph.add_node_in(2).is_err());

    hypergraph.add_hyperedge(vec![a, b, c]).unwrap();
    hypergraph.add_hyperedge(vec![c, c]).unwrap();

    let partition = hypergraph.communities().unwrap();
    assert_eq!(partition.members(0), &[a, c]);
    assert_eq!(partition.members(1), &[b]);
    assert_eq!(partition.community_of(b), Some(1));
    assert_eq!(partition.community_degree(0), 4);
    assert_eq!(partition.community_degree(1), 1);
    assert!(partition.incidence(0).iter().all(|n| *n == a || *n == c));
    hypergraph.check_invariants().unwrap();
}

#[test]
fn clique_expansion_weights_shared_hyperedges() {
    let mut hypergraph = Hypergraph::new();
    for _ in 0..4 {
        hypergraph.add_node().unwrap();
    }
    hypergraph.add_hyperedge(vec![node(0), node(1), node(2)]).unwrap();
    hypergraph.add_hyperedge(vec![node(1), node(2), node(2)]).unwrap();
    hypergraph.add_hyperedge(vec![node(3)]).unwrap();

    let graph = hypergraph.clique_expansion();
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.weight(node(0), node(1)), Some(1));
    assert_eq!(graph.weight(node(1), node(2)), Some(3));
    assert_eq!(graph.weight(node(0), node(3)), None);
    graph.check_invariants().unwrap();
}

use std::io::Cursor;

use fll_core::rng::RngHandle;
use fll_core::NodeId;
use fll_graph::{
    canonical_hash, graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json,
    hypergraph_from_bytes, hypergraph_from_json, hypergraph_hash, hypergraph_to_json,
    read_edge_list, read_hyperedge_list, write_edge_list, write_hyperedge_list, Graph, Hypergraph,
    MAX_NODES,
};
use proptest::prelude::*;

fn random_graph(seed: u64, nodes: usize, edges: usize) -> Graph {
    let mut rng = RngHandle::from_seed(seed);
    let mut graph = Graph::with_nodes(nodes);
    for _ in 0..edges {
        let a = rng.index(nodes);
        let b = rng.index(nodes);
        if a != b {
            graph
                .add_edge(NodeId::from_index(a), NodeId::from_index(b))
                .unwrap();
        }
    }
    graph
}

fn random_hypergraph(seed: u64, nodes: usize, edges: usize, communities: usize) -> Hypergraph {
    let mut rng = RngHandle::from_seed(seed);
    let mut hypergraph = Hypergraph::with_communities(communities);
    for index in 0..nodes {
        hypergraph.add_node_in(index % communities).unwrap();
    }
    for _ in 0..edges {
        let size = 1 + rng.index(4);
        let members = (0..size)
            .map(|_| NodeId::from_index(rng.index(nodes)))
            .collect();
        hypergraph.add_hyperedge(members).unwrap();
    }
    hypergraph
}

#[test]
fn edge_list_keeps_isolated_nodes_and_weights() {
    let mut graph = Graph::with_nodes(5);
    graph.add_weighted_edge(NodeId::from_raw(0), NodeId::from_raw(2), 3).unwrap();
    graph.add_edge(NodeId::from_raw(1), NodeId::from_raw(2)).unwrap();

    let mut buffer = Vec::new();
    write_edge_list(&graph, &mut buffer).unwrap();
    let text = String::from_utf8(buffer.clone()).unwrap();
    assert_eq!(text, "# nodes 5\n0 2 3\n1 2 1\n");

    let restored = read_edge_list(Cursor::new(buffer)).unwrap();
    assert_eq!(restored, graph);
}

#[test]
fn edge_list_reader_merges_unweighted_rows() {
    let input = "# comment\n0 1\n1 0\n\n2 1 4\n";
    let graph = read_edge_list(Cursor::new(input)).unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.weight(NodeId::from_raw(0), NodeId::from_raw(1)), Some(2));
    assert_eq!(graph.weight(NodeId::from_raw(1), NodeId::from_raw(2)), Some(4));

    let err = read_edge_list(Cursor::new("0 x\n")).unwrap_err();
    assert_eq!(err.info().code, "parse-field");
    assert_eq!(err.info().context.get("line").map(String::as_str), Some("1"));

    let err = read_edge_list(Cursor::new("3 3\n")).unwrap_err();
    assert_eq!(err.info().code, "self-loop");
}

#[test]
fn hyperedge_list_roundtrip_preserves_member_order() {
    let mut hypergraph = Hypergraph::new();
    for _ in 0..4 {
        hypergraph.add_node().unwrap();
    }
    hypergraph
        .add_hyperedge(vec![NodeId::from_raw(2), NodeId::from_raw(0), NodeId::from_raw(2)])
        .unwrap();

    let mut buffer = Vec::new();
    write_hyperedge_list(&hypergraph, &mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "# nodes 4\n2 0 2\n");
    let restored = read_hyperedge_list(Cursor::new(buffer)).unwrap();
    assert_eq!(restored, hypergraph);
}

#[test]
fn hypergraph_json_keeps_communities() {
    let hypergraph = random_hypergraph(11, 9, 12, 3);
    let json = hypergraph_to_json(&hypergraph).unwrap();
    let restored = hypergraph_from_json(&json).unwrap();
    assert_eq!(restored, hypergraph);
    restored.check_invariants().unwrap();
}

#[test]
fn foreign_schema_major_is_rejected() {
    let graph = random_graph(3, 4, 6);
    let json = graph_to_json(&graph).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["schema_version"]["major"] = serde_json::json!(9);
    let err = graph_from_json(&value.to_string()).unwrap_err();
    assert_eq!(err.info().code, "schema-version");
}

#[test]
fn oversized_identifiers_and_headers_are_rejected() {
    let err = read_edge_list(Cursor::new("0 18446744073709551615 1\n")).unwrap_err();
    assert_eq!(err.info().code, "node-limit");
    assert_eq!(err.info().context.get("line").map(String::as_str), Some("1"));

    let err = read_edge_list(Cursor::new(format!("0 {MAX_NODES}\n"))).unwrap_err();
    assert_eq!(err.info().code, "node-limit");

    let err = read_edge_list(Cursor::new("# nodes 18446744073709551615\n0 1\n")).unwrap_err();
    assert_eq!(err.info().code, "node-limit");

    let err =
        read_hyperedge_list(Cursor::new("# nodes 3\n0 1 18446744073709551615\n")).unwrap_err();
    assert_eq!(err.info().code, "node-limit");
    assert_eq!(err.info().context.get("line").map(String::as_str), Some("2"));

    let graph = random_graph(5, 4, 3);
    let json = graph_to_json(&graph).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["nodes"] = serde_json::json!(u64::MAX);
    let err = graph_from_json(&value.to_string()).unwrap_err();
    assert_eq!(err.info().code, "node-limit");

    let graph = read_edge_list(Cursor::new("# nodes 7\n0 1\n")).unwrap();
    assert_eq!(graph.node_count(), 7);
}

proptest! {
    #[test]
    fn graph_payloads_preserve_hash(seed in any::<u64>(), nodes in 2usize..12, edges in 0usize..40) {
        let graph = random_graph(seed, nodes, edges);
        let hash = canonical_hash(&graph);

        let from_json = graph_from_json(&graph_to_json(&graph).unwrap()).unwrap();
        let from_bytes = graph_from_bytes(&graph_to_bytes(&graph).unwrap()).unwrap();
        prop_assert_eq!(&canonical_hash(&from_json), &hash);
        prop_assert_eq!(&canonical_hash(&from_bytes), &hash);
        prop_assert!(from_bytes.check_invariants().is_ok());
    }

    #[test]
    fn hypergraph_bytes_preserve_hash(seed in any::<u64>(), nodes in 1usize..10, edges in 0usize..20) {
        let hypergraph = random_hypergraph(seed, nodes, edges, 2);
        let bytes = fll_graph::hypergraph_to_bytes(&hypergraph).unwrap();
        let restored = hypergraph_from_bytes(&bytes).unwrap();
        prop_assert_eq!(hypergraph_hash(&restored), hypergraph_hash(&hypergraph));
    }
}

#![deny(missing_docs)]
#![doc = "Weighted graphs and community-partitioned hypergraphs produced by the FLL generators, with text, JSON and binary persistence, canonical hashing and degree statistics."]

/// Weighted simple graph.
pub mod graph;
/// Canonical structural hashes.
pub mod hash;
/// Hypergraph with an optional community partition.
pub mod hypergraph;
/// Text, JSON and binary persistence.
pub mod serialization;
/// Degree and hyperedge-size statistics.
pub mod stats;
/// Degree access shared by both structures.
pub mod view;

pub use graph::Graph;
pub use hash::{canonical_hash, hypergraph_hash};
pub use hypergraph::{CommunityPartition, Hypergraph};
pub use serialization::{
    graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json, hypergraph_from_bytes,
    hypergraph_from_json, hypergraph_to_bytes, hypergraph_to_json, read_edge_list,
    read_hyperedge_list, write_edge_list, write_hyperedge_list, GRAPH_SCHEMA, MAX_NODES,
};
pub use stats::{degree_histogram, degree_stats, hyperedge_size_histogram, DegreeStats};
pub use view::DegreeView;

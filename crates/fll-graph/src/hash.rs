use sha2::{Digest, Sha256};

use crate::graph::Graph;
use crate::hypergraph::Hypergraph;
use crate::serialization::GRAPH_SCHEMA;

/// Computes the canonical structural hash of a weighted graph.
///
/// Edges are hashed in ascending pair order, so two graphs with the same node
/// count and the same weighted edge set share a hash.
pub fn canonical_hash(graph: &Graph) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"graph");
    encode_schema(&mut hasher);
    hasher.update((graph.node_count() as u64).to_le_bytes());
    hasher.update((graph.edge_count() as u64).to_le_bytes());
    for (a, b, weight) in graph.weighted_edges() {
        hasher.update(a.as_raw().to_le_bytes());
        hasher.update(b.as_raw().to_le_bytes());
        hasher.update(weight.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Computes the canonical hash of a hypergraph.
///
/// Each hyperedge is reduced to its sorted member list and the lists are
/// sorted, so creation order and member order do not affect the hash.
/// Community assignments are included when present.
pub fn hypergraph_hash(hypergraph: &Hypergraph) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"hypergraph");
    encode_schema(&mut hasher);
    hasher.update((hypergraph.node_count() as u64).to_le_bytes());

    let mut signatures: Vec<Vec<u64>> = hypergraph
        .hyperedges()
        .iter()
        .map(|members| {
            let mut raw: Vec<u64> = members.iter().map(|node| node.as_raw()).collect();
            raw.sort_unstable();
            raw
        })
        .collect();
    signatures.sort();
    hasher.update((signatures.len() as u64).to_le_bytes());
    for signature in &signatures {
        update_slice(signature, &mut hasher);
    }

    match hypergraph.communities() {
        Some(partition) => {
            hasher.update(b"communities:some");
            hasher.update((partition.count() as u64).to_le_bytes());
            let assignments: Vec<u64> =
                partition.assignments().iter().map(|&c| c as u64).collect();
            update_slice(&assignments, &mut hasher);
        }
        None => hasher.update(b"communities:none"),
    }
    format!("{:x}", hasher.finalize())
}

fn encode_schema(hasher: &mut Sha256) {
    hasher.update(GRAPH_SCHEMA.major.to_le_bytes());
    hasher.update(GRAPH_SCHEMA.minor.to_le_bytes());
    hasher.update(GRAPH_SCHEMA.patch.to_le_bytes());
}

fn update_slice(values: &[u64], hasher: &mut Sha256) {
    hasher.update((values.len() as u64).to_le_bytes());
    for value in values {
        hasher.update(value.to_le_bytes());
    }
}

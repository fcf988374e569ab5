use std::collections::BTreeMap;

use fll_core::{FllError, NodeId};

use crate::view::DegreeView;

/// Simple undirected graph with a weighted edge multiset.
///
/// Choosing the same pair twice increments the weight of the existing edge
/// instead of adding a parallel one. Self-loops are rejected. Degrees count
/// weighted edge occurrences, so `Σ degree == 2 · total_weight` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    degrees: Vec<u64>,
    edges: BTreeMap<(NodeId, NodeId), u64>,
    total_weight: u64,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with `count` isolated nodes.
    pub fn with_nodes(count: usize) -> Self {
        Self {
            degrees: vec![0; count],
            ..Self::default()
        }
    }

    /// Appends a node and returns its identifier.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId::from_index(self.degrees.len());
        self.degrees.push(0);
        id
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    /// Number of distinct node pairs joined by an edge.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Adds one occurrence of edge `{a, b}` and returns its new weight.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<u64, FllError> {
        self.add_weighted_edge(a, b, 1)
    }

    /// Adds `weight` occurrences of edge `{a, b}` and returns its new weight.
    pub fn add_weighted_edge(&mut self, a: NodeId, b: NodeId, weight: u64) -> Result<u64, FllError> {
        if a == b {
            return Err(FllError::graph("self-loop", "edges must join two distinct nodes")
                .with_context("node", a));
        }
        if weight == 0 {
            return Err(FllError::graph("zero-weight", "edge weights must be positive")
                .with_context("a", a)
                .with_context("b", b));
        }
        self.ensure_node(a)?;
        self.ensure_node(b)?;
        let key = ordered(a, b);
        let entry = self.edges.entry(key).or_insert(0);
        *entry += weight;
        let updated = *entry;
        self.degrees[a.index()] += weight;
        self.degrees[b.index()] += weight;
        self.total_weight += weight;
        Ok(updated)
    }

    /// Weight of edge `{a, b}`, if present.
    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<u64> {
        self.edges.get(&ordered(a, b)).copied()
    }

    /// Degree of `node`.
    pub fn degree(&self, node: NodeId) -> Result<u64, FllError> {
        self.degrees
            .get(node.index())
            .copied()
            .ok_or_else(|| unknown_node(node))
    }

    /// Degrees of all nodes, indexed by node position.
    pub fn degrees(&self) -> &[u64] {
        &self.degrees
    }

    /// Iterates over all node identifiers.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        (0..self.degrees.len()).map(NodeId::from_index)
    }

    /// Iterates over `(a, b, weight)` with `a < b`, in ascending pair order.
    pub fn weighted_edges(&self) -> impl ExactSizeIterator<Item = (NodeId, NodeId, u64)> + '_ {
        self.edges.iter().map(|(&(a, b), &weight)| (a, b, weight))
    }

    /// Verifies the handshake lemma and the absence of self-loops.
    pub fn check_invariants(&self) -> Result<(), FllError> {
        let degree_sum: u64 = self.degrees.iter().sum();
        if degree_sum != 2 * self.total_weight {
            return Err(
                FllError::invariant("handshake", "degree sum differs from twice the edge weight")
                    .with_context("degree_sum", degree_sum)
                    .with_context("total_weight", self.total_weight),
            );
        }
        let mut recomputed = vec![0u64; self.degrees.len()];
        for (&(a, b), &weight) in &self.edges {
            if a == b {
                return Err(FllError::invariant("self-loop", "graph contains a self-loop")
                    .with_context("node", a));
            }
            recomputed[a.index()] += weight;
            recomputed[b.index()] += weight;
        }
        if let Some(index) = (0..recomputed.len()).find(|&i| recomputed[i] != self.degrees[i]) {
            return Err(FllError::invariant(
                "degree-mismatch",
                "tracked degree differs from incident edge weight",
            )
            .with_context("node", index)
            .with_context("tracked", self.degrees[index])
            .with_context("incident", recomputed[index]));
        }
        Ok(())
    }

    fn ensure_node(&self, node: NodeId) -> Result<(), FllError> {
        if node.index() < self.degrees.len() {
            Ok(())
        } else {
            Err(unknown_node(node))
        }
    }
}

impl DegreeView for Graph {
    fn node_count(&self) -> usize {
        self.degrees.len()
    }

    fn degree_of(&self, index: usize) -> u64 {
        self.degrees[index]
    }
}

fn ordered(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub(crate) fn unknown_node(node: NodeId) -> FllError {
    FllError::graph("unknown-node", "node does not exist").with_context("node", node)
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hypergraph::Hypergraph;
use crate::view::DegreeView;

/// Summary statistics of a degree sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegreeStats {
    /// Smallest degree, zero for an empty sequence.
    pub min: u64,
    /// Largest degree, zero for an empty sequence.
    pub max: u64,
    /// Mean degree, zero for an empty sequence.
    pub mean: f64,
}

/// Number of nodes per degree value, in ascending degree order.
pub fn degree_histogram<G: DegreeView + ?Sized>(view: &G) -> BTreeMap<u64, u64> {
    let mut histogram = BTreeMap::new();
    for degree in view.degree_iter() {
        *histogram.entry(degree).or_insert(0) += 1;
    }
    histogram
}

/// Number of hyperedges per member count.
pub fn hyperedge_size_histogram(hypergraph: &Hypergraph) -> BTreeMap<usize, u64> {
    let mut histogram = BTreeMap::new();
    for members in hypergraph.hyperedges() {
        *histogram.entry(members.len()).or_insert(0) += 1;
    }
    histogram
}

/// Minimum, maximum and mean degree.
pub fn degree_stats<G: DegreeView + ?Sized>(view: &G) -> DegreeStats {
    let count = view.node_count();
    if count == 0 {
        return DegreeStats {
            min: 0,
            max: 0,
            mean: 0.0,
        };
    }
    let mut min = u64::MAX;
    let mut max = 0;
    let mut sum = 0u128;
    for degree in view.degree_iter() {
        min = min.min(degree);
        max = max.max(degree);
        sum += u128::from(degree);
    }
    DegreeStats {
        min,
        max,
        mean: sum as f64 / count as f64,
    }
}

//! Degree-class urns with degree-weighted sampling.

use std::collections::BTreeMap;

use fll_core::{FllError, NodeId, RngHandle};
use indexmap::{IndexMap, IndexSet};
use rand::Rng;

/// Partition of the active nodes into buckets indexed by degree class.
///
/// A weighted draw first picks a class with probability proportional to
/// `i · |bucket_i|` and then a uniform member of that bucket, so a node is
/// drawn with probability proportional to its class. Class weights live in a
/// prefix-sum tree, which keeps both the class search and promotion
/// logarithmic in the largest class.
#[derive(Debug, Clone, Default)]
pub struct UrnRegistry {
    buckets: Vec<IndexSet<NodeId>>,
    active: IndexMap<NodeId, usize>,
    inactive: BTreeMap<NodeId, usize>,
    weights: ClassWeights,
}

impl UrnRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fresh node at class 0.
    pub fn insert(&mut self, node: NodeId) -> Result<(), FllError> {
        self.insert_at(node, 0)
    }

    /// Adds a fresh node at `class`.
    pub fn insert_at(&mut self, node: NodeId, class: usize) -> Result<(), FllError> {
        if self.active.contains_key(&node) || self.inactive.contains_key(&node) {
            return Err(FllError::invariant(
                "urn-duplicate",
                "node is already tracked by the urn registry",
            )
            .with_context("node", node));
        }
        self.active.insert(node, class);
        self.bucket_mut(class).insert(node);
        self.weights.add(class, class as u64);
        Ok(())
    }

    /// Moves an active node from class `i` to class `i + 1`.
    pub fn promote(&mut self, node: NodeId) -> Result<(), FllError> {
        let class = self
            .active
            .get_mut(&node)
            .ok_or_else(|| not_active("urn-promote", node))?;
        let from = *class;
        *class = from + 1;
        self.buckets[from].swap_remove(&node);
        self.bucket_mut(from + 1).insert(node);
        self.weights.sub(from, from as u64);
        self.weights.add(from + 1, (from + 1) as u64);
        Ok(())
    }

    /// Moves an active node into the inactive store and returns its class.
    pub fn deactivate(&mut self, node: NodeId) -> Result<usize, FllError> {
        let class = self
            .active
            .swap_remove(&node)
            .ok_or_else(|| not_active("urn-deactivate", node))?;
        self.buckets[class].swap_remove(&node);
        self.weights.sub(class, class as u64);
        self.inactive.insert(node, class);
        Ok(class)
    }

    /// Draws an active node with probability proportional to its class.
    pub fn sample_weighted(&self, rng: &mut RngHandle) -> Result<NodeId, FllError> {
        let total = self.weights.total();
        if total == 0 {
            return Err(self.empty("weighted"));
        }
        let target = rng.inner_mut().gen_range(0..total);
        let class = self.weights.find(target);
        let bucket = &self.buckets[class];
        bucket
            .get_index(rng.index(bucket.len()))
            .copied()
            .ok_or_else(|| self.empty("weighted").with_context("class", class))
    }

    /// Draws an active node uniformly, ignoring classes.
    pub fn sample_uniform(&self, rng: &mut RngHandle) -> Result<NodeId, FllError> {
        if self.active.is_empty() {
            return Err(self.empty("uniform"));
        }
        self.active
            .get_index(rng.index(self.active.len()))
            .map(|(node, _)| *node)
            .ok_or_else(|| self.empty("uniform"))
    }

    /// Draws an active node other than `excluded` uniformly.
    pub fn sample_uniform_excluding(
        &self,
        excluded: NodeId,
        rng: &mut RngHandle,
    ) -> Result<NodeId, FllError> {
        let eligible = self.active.len() - usize::from(self.active.contains_key(&excluded));
        if eligible == 0 {
            return Err(self.empty("uniform-excluding").with_context("excluded", excluded));
        }
        loop {
            let candidate = self.sample_uniform(rng)?;
            if candidate != excluded {
                return Ok(candidate);
            }
        }
    }

    /// Class of an active node.
    pub fn class_of(&self, node: NodeId) -> Option<usize> {
        self.active.get(&node).copied()
    }

    /// Class an inactive node had when it was deactivated.
    pub fn inactive_class_of(&self, node: NodeId) -> Option<usize> {
        self.inactive.get(&node).copied()
    }

    /// Number of active nodes.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no node is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of active nodes that a weighted draw can return.
    pub fn weighted_len(&self) -> usize {
        self.active.len() - self.buckets.first().map_or(0, IndexSet::len)
    }

    /// Sum of `i · |bucket_i|` over all classes.
    pub fn weight(&self) -> u64 {
        self.weights.total()
    }

    /// Number of deactivated nodes.
    pub fn inactive_len(&self) -> usize {
        self.inactive.len()
    }

    /// Number of active nodes in `class`.
    pub fn bucket_len(&self, class: usize) -> usize {
        self.buckets.get(class).map_or(0, IndexSet::len)
    }

    /// Verifies that the buckets partition exactly the active set and that
    /// the cached weights agree with the bucket sizes.
    pub fn check_invariants(&self) -> Result<(), FllError> {
        let mut listed = 0usize;
        let mut weight = 0u64;
        for (class, bucket) in self.buckets.iter().enumerate() {
            for node in bucket {
                if self.active.get(node) != Some(&class) {
                    return Err(FllError::invariant(
                        "urn-bucket-mismatch",
                        "bucket member is not active at that class",
                    )
                    .with_context("node", node)
                    .with_context("class", class));
                }
            }
            let class_weight = class as u64 * bucket.len() as u64;
            if self.weights.get(class) != class_weight {
                return Err(FllError::invariant(
                    "urn-weight-mismatch",
                    "cached class weight differs from bucket size",
                )
                .with_context("class", class)
                .with_context("cached", self.weights.get(class))
                .with_context("expected", class_weight));
            }
            listed += bucket.len();
            weight += class_weight;
        }
        if listed != self.active.len() {
            return Err(FllError::invariant(
                "urn-partition",
                "buckets do not cover the active set exactly once",
            )
            .with_context("bucketed", listed)
            .with_context("active", self.active.len()));
        }
        if weight != self.weights.total() {
            return Err(FllError::invariant("urn-weight-total", "cached total weight is stale")
                .with_context("cached", self.weights.total())
                .with_context("expected", weight));
        }
        if let Some(node) = self.inactive.keys().find(|node| self.active.contains_key(*node)) {
            return Err(FllError::invariant(
                "urn-inactive-overlap",
                "node is both active and inactive",
            )
            .with_context("node", node));
        }
        Ok(())
    }

    fn bucket_mut(&mut self, class: usize) -> &mut IndexSet<NodeId> {
        if class >= self.buckets.len() {
            self.buckets.resize_with(class + 1, IndexSet::new);
        }
        &mut self.buckets[class]
    }

    fn empty(&self, draw: &str) -> FllError {
        FllError::invariant("urn-empty", "sampled an empty urn aggregate")
            .with_context("draw", draw)
            .with_context("active", self.active.len())
            .with_context("inactive", self.inactive.len())
            .with_context("weight", self.weights.total())
    }
}

fn not_active(code: &str, node: NodeId) -> FllError {
    FllError::invariant(code, "node is not active").with_context("node", node)
}

/// Fenwick tree of per-class weights with on-demand growth.
#[derive(Debug, Clone, Default)]
struct ClassWeights {
    tree: Vec<u64>,
    values: Vec<u64>,
    total: u64,
}

impl ClassWeights {
    fn total(&self) -> u64 {
        self.total
    }

    fn get(&self, class: usize) -> u64 {
        self.values.get(class).copied().unwrap_or(0)
    }

    fn add(&mut self, class: usize, delta: u64) {
        if delta == 0 {
            return;
        }
        self.grow(class);
        self.values[class] += delta;
        self.total += delta;
        let mut index = class + 1;
        while index <= self.tree.len() {
            self.tree[index - 1] += delta;
            index += index & index.wrapping_neg();
        }
    }

    fn sub(&mut self, class: usize, delta: u64) {
        if delta == 0 {
            return;
        }
        self.values[class] -= delta;
        self.total -= delta;
        let mut index = class + 1;
        while index <= self.tree.len() {
            self.tree[index - 1] -= delta;
            index += index & index.wrapping_neg();
        }
    }

    /// Smallest class whose cumulative weight exceeds `target`.
    /// Requires `target < total`.
    fn find(&self, target: u64) -> usize {
        let mut position = 0usize;
        let mut remaining = target;
        let mut step = self.tree.len().next_power_of_two();
        while step > 0 {
            let next = position + step;
            if next <= self.tree.len() && self.tree[next - 1] <= remaining {
                remaining -= self.tree[next - 1];
                position = next;
            }
            step >>= 1;
        }
        position
    }

    fn grow(&mut self, class: usize) {
        if class < self.tree.len() {
            return;
        }
        let capacity = (class + 1).next_power_of_two().max(16);
        self.values.resize(capacity, 0);
        self.tree = self.values.clone();
        for index in 1..=capacity {
            let parent = index + (index & index.wrapping_neg());
            if parent <= capacity {
                self.tree[parent - 1] += self.tree[index - 1];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_search_follows_cumulative_weights() {
        let mut weights = ClassWeights::default();
        weights.add(1, 3);
        weights.add(4, 8);
        weights.add(40, 40);
        assert_eq!(weights.total(), 51);
        assert_eq!(weights.find(0), 1);
        assert_eq!(weights.find(2), 1);
        assert_eq!(weights.find(3), 4);
        assert_eq!(weights.find(10), 4);
        assert_eq!(weights.find(11), 40);
        assert_eq!(weights.find(50), 40);
        weights.sub(4, 8);
        assert_eq!(weights.find(3), 40);
    }
}

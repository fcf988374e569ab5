use std::collections::BTreeMap;

use fll_core::{EdgeId, FllError, NodeId};

use crate::graph::{unknown_node, Graph};
use crate::view::DegreeView;

/// Partition of the nodes of a [`Hypergraph`] into communities.
///
/// Besides the member lists, every community keeps an incidence list: each
/// member appears there once per hyperedge membership, so a uniform draw from
/// the list is a degree-weighted draw among the community's members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityPartition {
    community_of: Vec<usize>,
    members: Vec<Vec<NodeId>>,
    incidence: Vec<Vec<NodeId>>,
}

impl CommunityPartition {
    fn new(count: usize) -> Self {
        Self {
            community_of: Vec::new(),
            members: vec![Vec::new(); count],
            incidence: vec![Vec::new(); count],
        }
    }

    /// Number of communities.
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Community of `node`.
    pub fn community_of(&self, node: NodeId) -> Option<usize> {
        self.community_of.get(node.index()).copied()
    }

    /// Community of every node, indexed by node position.
    pub fn assignments(&self) -> &[usize] {
        &self.community_of
    }

    /// Members of `community` in insertion order.
    pub fn members(&self, community: usize) -> &[NodeId] {
        self.members
            .get(community)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Degree-weighted incidence list of `community`.
    pub fn incidence(&self, community: usize) -> &[NodeId] {
        self.incidence
            .get(community)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of the degrees of the members of `community`.
    pub fn community_degree(&self, community: usize) -> usize {
        self.incidence(community).len()
    }
}

/// Hypergraph with ordered, variable-arity hyperedges.
///
/// A hyperedge may list the same node more than once; each occurrence counts
/// towards the node's degree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hypergraph {
    degrees: Vec<u64>,
    hyperedges: Vec<Vec<NodeId>>,
    communities: Option<CommunityPartition>,
}

impl Hypergraph {
    /// Creates an empty hypergraph without communities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty hypergraph partitioned into `count` communities.
    pub fn with_communities(count: usize) -> Self {
        Self {
            communities: Some(CommunityPartition::new(count)),
            ..Self::default()
        }
    }

    /// Appends a node. Fails on a community-partitioned hypergraph.
    pub fn add_node(&mut self) -> Result<NodeId, FllError> {
        if self.communities.is_some() {
            return Err(FllError::graph(
                "community-required",
                "nodes of a partitioned hypergraph must name their community",
            ));
        }
        Ok(self.push_node())
    }

    /// Appends a node to `community`.
    pub fn add_node_in(&mut self, community: usize) -> Result<NodeId, FllError> {
        let count = self.communities.as_ref().map_or(0, CommunityPartition::count);
        if community >= count {
            return Err(FllError::graph("unknown-community", "community does not exist")
                .with_context("community", community)
                .with_context("communities", count));
        }
        let id = self.push_node();
        if let Some(partition) = self.communities.as_mut() {
            partition.community_of.push(community);
            partition.members[community].push(id);
        }
        Ok(id)
    }

    fn push_node(&mut self) -> NodeId {
        let id = NodeId::from_index(self.degrees.len());
        self.degrees.push(0);
        id
    }

    /// Appends a hyperedge and updates degrees and incidence lists.
    pub fn add_hyperedge(&mut self, members: Vec<NodeId>) -> Result<EdgeId, FllError> {
        if members.is_empty() {
            return Err(FllError::graph(
                "empty-hyperedge",
                "hyperedges require at least one member",
            ));
        }
        if let Some(missing) = members.iter().find(|node| node.index() >= self.degrees.len()) {
            return Err(unknown_node(*missing));
        }
        for node in &members {
            self.degrees[node.index()] += 1;
            if let Some(partition) = self.communities.as_mut() {
                let community = partition.community_of[node.index()];
                partition.incidence[community].push(*node);
            }
        }
        let id = EdgeId::from_raw(self.hyperedges.len() as u64);
        self.hyperedges.push(members);
        Ok(id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    /// Number of hyperedges.
    pub fn edge_count(&self) -> usize {
        self.hyperedges.len()
    }

    /// Members of a hyperedge.
    pub fn hyperedge(&self, edge: EdgeId) -> Result<&[NodeId], FllError> {
        self.hyperedges
            .get(edge.as_raw() as usize)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                FllError::graph("unknown-edge", "hyperedge does not exist")
                    .with_context("edge", edge.as_raw())
            })
    }

    /// All hyperedges in creation order.
    pub fn hyperedges(&self) -> &[Vec<NodeId>] {
        &self.hyperedges
    }

    /// Degree (membership count) of `node`.
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

    /// Community partition, if any.
    pub fn communities(&self) -> Option<&CommunityPartition> {
        self.communities.as_ref()
    }

    /// Weighted pairwise projection: every pair of distinct members of a
    /// hyperedge contributes weight one to the edge joining them.
    pub fn clique_expansion(&self) -> Graph {
        let mut pairs: BTreeMap<(NodeId, NodeId), u64> = BTreeMap::new();
        for members in &self.hyperedges {
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    if a == b {
                        continue;
                    }
                    let key = if a < b { (*a, *b) } else { (*b, *a) };
                    *pairs.entry(key).or_insert(0) += 1;
                }
            }
        }
        let mut graph = Graph::with_nodes(self.degrees.len());
        for ((a, b), weight) in pairs {
            // Keys are distinct in-range pairs with positive weight.
            let _ = graph.add_weighted_edge(a, b, weight);
        }
        graph
    }

    /// Verifies degree bookkeeping and, when present, that the community
    /// partition is a disjoint cover whose incidence lists match degrees.
    pub fn check_invariants(&self) -> Result<(), FllError> {
        let mut memberships = vec![0u64; self.degrees.len()];
        for members in &self.hyperedges {
            for node in members {
                let slot = memberships.get_mut(node.index()).ok_or_else(|| {
                    FllError::invariant("dangling-member", "hyperedge names an unknown node")
                        .with_context("node", node)
                })?;
                *slot += 1;
            }
        }
        if let Some(index) = (0..memberships.len()).find(|&i| memberships[i] != self.degrees[i]) {
            return Err(FllError::invariant(
                "degree-mismatch",
                "tracked degree differs from hyperedge membership count",
            )
            .with_context("node", index)
            .with_context("tracked", self.degrees[index])
            .with_context("memberships", memberships[index]));
        }
        if let Some(partition) = &self.communities {
            check_partition(partition, &self.degrees)?;
        }
        Ok(())
    }
}

fn check_partition(partition: &CommunityPartition, degrees: &[u64]) -> Result<(), FllError> {
    if partition.community_of.len() != degrees.len() {
        return Err(FllError::invariant(
            "partition-size",
            "community assignments do not cover every node",
        )
        .with_context("assigned", partition.community_of.len())
        .with_context("nodes", degrees.len()));
    }
    let mut seen = vec![false; degrees.len()];
    for (community, members) in partition.members.iter().enumerate() {
        for node in members {
            let index = node.index();
            if index >= degrees.len() || seen[index] {
                return Err(FllError::invariant(
                    "partition-overlap",
                    "node listed twice or out of range in community members",
                )
                .with_context("node", node)
                .with_context("community", community));
            }
            seen[index] = true;
            if partition.community_of[index] != community {
                return Err(FllError::invariant(
                    "partition-mismatch",
                    "member list disagrees with the node's recorded community",
                )
                .with_context("node", node)
                .with_context("listed", community)
                .with_context("recorded", partition.community_of[index]));
            }
        }
    }
    if let Some(index) = seen.iter().position(|covered| !covered) {
        return Err(
            FllError::invariant("partition-gap", "node belongs to no community")
                .with_context("node", index),
        );
    }
    for (community, incidence) in partition.incidence.iter().enumerate() {
        let expected: u64 = partition.members[community]
            .iter()
            .map(|node| degrees[node.index()])
            .sum();
        let foreign = incidence
            .iter()
            .any(|node| partition.community_of.get(node.index()) != Some(&community));
        if foreign || incidence.len() as u64 != expected {
            return Err(FllError::invariant(
                "incidence-mismatch",
                "community incidence list disagrees with member degrees",
            )
            .with_context("community", community)
            .with_context("incidence", incidence.len())
            .with_context("expected", expected));
        }
    }
    Ok(())
}

impl DegreeView for Hypergraph {
    fn node_count(&self) -> usize {
        self.degrees.len()
    }

    fn degree_of(&self, index: usize) -> u64 {
        self.degrees[index]
    }
}

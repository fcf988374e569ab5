//! Community-partitioned hypergraph process.

use fll_core::{ConfigReason, FllError, MemberPolicy, NodeId, ParameterSet, ProcessKind, RngHandle};
use fll_graph::Hypergraph;

use crate::process::{Process, Transition, TransitionCounts};

/// Grows a hypergraph whose nodes belong to communities.
///
/// Inserted nodes join a community drawn from the membership vector. A new
/// hyperedge spans an ordered community pair `(q1, q2)` drawn from the
/// collaboration matrix and concatenates one sub-hyperedge per community,
/// each with its own cardinality. Members are drawn uniformly among the
/// community's nodes with probability `γx / (y + γx)`, where `x` is the
/// community size and `y` its summed degree, and from the community's
/// incidence list otherwise.
///
/// There is no deactivation, and an insertion only assigns the new node to a
/// community without seeding a hyperedge. Initial nodes are dealt round-robin
/// so every community starts non-empty.
#[derive(Debug, Clone)]
pub struct CommunityGenerator<'a> {
    params: &'a ParameterSet,
    hypergraph: Hypergraph,
    steps: u64,
    counts: TransitionCounts,
}

impl<'a> CommunityGenerator<'a> {
    /// Builds the initial state. Fails unless `params` describes a community process.
    pub fn new(params: &'a ParameterSet) -> Result<Self, FllError> {
        if !matches!(params.process(), ProcessKind::Community(_)) {
            return Err(FllError::config(
                ConfigReason::KindMismatch,
                "community generator needs a community parameter set",
            )
            .with_context("kind", params.process().label()));
        }
        let count = params.community_count();
        let mut hypergraph = Hypergraph::with_communities(count);
        for index in 0..params.initial_nodes() {
            hypergraph.add_node_in(index % count)?;
        }
        tracing::debug!(
            initial = params.initial_nodes(),
            communities = count,
            exploration = params.exploration(),
            "community generator seeded"
        );
        Ok(Self {
            params,
            hypergraph,
            steps: 0,
            counts: TransitionCounts::default(),
        })
    }

    /// Hypergraph built so far.
    pub fn hypergraph(&self) -> &Hypergraph {
        &self.hypergraph
    }

    fn insert(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let community = self.params.sample_community(rng).ok_or_else(missing_samplers)?;
        self.hypergraph.add_node_in(community)?;
        Ok(())
    }

    fn form(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let (first, second) = self
            .params
            .sample_community_pair(rng)
            .ok_or_else(missing_samplers)?;
        let mut members = Vec::new();
        for community in [first, second] {
            let cardinality = self.params.sample_cardinality(rng);
            self.draw_sub_hyperedge(community, cardinality, &mut members, rng)?;
        }
        if members.is_empty() {
            return Err(FllError::invariant(
                "empty-hyperedge",
                "community draw produced no members",
            )
            .with_context("first", first)
            .with_context("second", second));
        }
        self.hypergraph.add_hyperedge(members)?;
        Ok(())
    }

    fn draw_sub_hyperedge(
        &self,
        community: usize,
        cardinality: usize,
        members: &mut Vec<NodeId>,
        rng: &mut RngHandle,
    ) -> Result<(), FllError> {
        let partition = self.hypergraph.communities().ok_or_else(|| {
            FllError::invariant("missing-partition", "community hypergraph lost its partition")
        })?;
        let pool = partition.members(community);
        let incidence = partition.incidence(community);
        if pool.is_empty() {
            return Err(FllError::invariant("empty-community", "community has no members")
                .with_context("community", community)
                .with_context("nodes", self.hypergraph.node_count()));
        }
        let target = match self.params.member_policy() {
            MemberPolicy::WithReplacement => cardinality,
            MemberPolicy::Distinct => {
                let taken = members
                    .iter()
                    .filter(|node| partition.community_of(**node) == Some(community))
                    .count();
                cardinality.min(pool.len() - taken)
            }
        };
        let size = pool.len() as f64;
        let explore = self.params.exploration() * size;
        let explore_probability = explore / (incidence.len() as f64 + explore);

        let mut drawn = 0;
        while drawn < target {
            let node = if rng.unit() < explore_probability {
                pool[rng.index(pool.len())]
            } else {
                incidence[rng.index(incidence.len())]
            };
            if self.params.member_policy() == MemberPolicy::Distinct && members.contains(&node) {
                continue;
            }
            members.push(node);
            drawn += 1;
        }
        Ok(())
    }
}

fn missing_samplers() -> FllError {
    FllError::invariant(
        "missing-community-samplers",
        "parameter set carries no community samplers",
    )
}

impl Process for CommunityGenerator<'_> {
    type Output = Hypergraph;

    fn params(&self) -> &ParameterSet {
        self.params
    }

    fn step(&mut self, rng: &mut RngHandle) -> Result<Transition, FllError> {
        let u_insert = rng.unit();
        let u_joint = rng.unit();
        let transition = if u_insert <= self.params.p() {
            self.insert(rng)?;
            Transition::Insert
        } else if u_joint < self.params.joint_insert_probability() {
            return Err(FllError::invariant(
                "unsupported-transition",
                "joint node-and-hyperedge insertion has no defined semantics",
            )
            .with_context("step", self.steps)
            .with_context("probability", self.params.joint_insert_probability()));
        } else {
            self.form(rng)?;
            Transition::Form
        };
        self.steps += 1;
        self.counts.record(transition);
        Ok(transition)
    }

    fn steps(&self) -> u64 {
        self.steps
    }

    fn node_count(&self) -> usize {
        self.hypergraph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.hypergraph.edge_count()
    }

    fn counts(&self) -> TransitionCounts {
        self.counts
    }

    fn check_invariants(&self) -> Result<(), FllError> {
        self.hypergraph.check_invariants()?;
        for (index, members) in self.hypergraph.hyperedges().iter().enumerate() {
            let mut spanned: Vec<usize> = Vec::with_capacity(2);
            for node in members {
                let community = self
                    .hypergraph
                    .communities()
                    .and_then(|partition| partition.community_of(*node))
                    .ok_or_else(|| {
                        FllError::invariant("unassigned-member", "member has no community")
                            .with_context("node", node)
                    })?;
                if !spanned.contains(&community) {
                    spanned.push(community);
                }
            }
            if spanned.len() > 2 {
                return Err(FllError::invariant(
                    "community-span",
                    "hyperedge spans more than two communities",
                )
                .with_context("hyperedge", index)
                .with_context("communities", spanned.len()));
            }
        }
        Ok(())
    }

    fn into_output(self) -> Hypergraph {
        self.hypergraph
    }
}

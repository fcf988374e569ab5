//! Hyperedge variant of the urn process, in regular and cutoff flavours.

use fll_core::{
    ConfigReason, FllError, HypergraphMode, MemberPolicy, NodeId, ParameterSet, ProcessKind,
    RngHandle,
};
use fll_graph::Hypergraph;

use crate::process::{Process, Transition, TransitionCounts};
use crate::urn::UrnRegistry;

/// Grows a hypergraph whose hyperedge cardinalities follow the configured
/// distribution.
///
/// An insertion adds a node and, once the hypergraph holds at least `c` nodes
/// for a drawn cardinality `c`, one hyperedge made of the new node and `c - 1`
/// degree-weighted active members. Otherwise a hyperedge of `c`
/// degree-weighted members is formed. In cutoff mode formation only happens
/// with probability `q`; the remaining steps deactivate a degree-weighted
/// active node, which keeps its past memberships but is never drawn again.
///
/// Once deactivations have drained every node of positive degree, a formation
/// or deactivation has nothing to draw and the step is recorded as
/// [`Transition::Idle`]. An insertion whose hyperedge would need weighted
/// members from such an urn leaves the new node without a hyperedge.
#[derive(Debug, Clone)]
pub struct HypergraphGenerator<'a> {
    params: &'a ParameterSet,
    mode: HypergraphMode,
    hypergraph: Hypergraph,
    urn: UrnRegistry,
    steps: u64,
    counts: TransitionCounts,
}

impl<'a> HypergraphGenerator<'a> {
    /// Builds the initial state: `initial_nodes` nodes sharing one hyperedge.
    pub fn new(params: &'a ParameterSet) -> Result<Self, FllError> {
        let mode = match params.process() {
            ProcessKind::Hypergraph { mode } => *mode,
            other => {
                return Err(FllError::config(
                    ConfigReason::KindMismatch,
                    "hypergraph generator needs a hypergraph parameter set",
                )
                .with_context("kind", other.label()))
            }
        };
        let mut hypergraph = Hypergraph::new();
        let mut urn = UrnRegistry::new();
        let seed: Vec<NodeId> = (0..params.initial_nodes())
            .map(|_| hypergraph.add_node())
            .collect::<Result<_, _>>()?;
        for node in &seed {
            urn.insert_at(*node, 1)?;
        }
        hypergraph.add_hyperedge(seed)?;
        tracing::debug!(
            initial = params.initial_nodes(),
            ?mode,
            "hypergraph generator seeded with one hyperedge"
        );
        Ok(Self {
            params,
            mode,
            hypergraph,
            urn,
            steps: 0,
            counts: TransitionCounts::default(),
        })
    }

    /// Hypergraph built so far.
    pub fn hypergraph(&self) -> &Hypergraph {
        &self.hypergraph
    }

    /// Urn registry of the active nodes.
    pub fn urn(&self) -> &UrnRegistry {
        &self.urn
    }

    fn insert(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let node = self.hypergraph.add_node()?;
        self.urn.insert(node)?;
        let cardinality = self.params.sample_cardinality(rng);
        if self.hypergraph.node_count() < cardinality
            || (cardinality > 1 && self.urn.weight() == 0)
        {
            return Ok(());
        }
        let mut members = vec![node];
        members.extend(draw_weighted_members(
            &self.urn,
            cardinality - 1,
            self.params.member_policy(),
            rng,
        )?);
        self.attach(members)
    }

    fn form(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let cardinality = self.params.sample_cardinality(rng);
        let members =
            draw_weighted_members(&self.urn, cardinality, self.params.member_policy(), rng)?;
        self.attach(members)
    }

    fn deactivate(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let node = self.urn.sample_weighted(rng)?;
        self.urn.deactivate(node)?;
        Ok(())
    }

    fn attach(&mut self, members: Vec<NodeId>) -> Result<(), FllError> {
        for node in &members {
            self.urn.promote(*node)?;
        }
        self.hypergraph.add_hyperedge(members)?;
        Ok(())
    }
}

/// Draws `count` degree-weighted active members.
///
/// With [`MemberPolicy::Distinct`] repeated draws are rejected and `count` is
/// clamped to the number of nodes a weighted draw can reach.
pub fn draw_weighted_members(
    urn: &UrnRegistry,
    count: usize,
    policy: MemberPolicy,
    rng: &mut RngHandle,
) -> Result<Vec<NodeId>, FllError> {
    match policy {
        MemberPolicy::WithReplacement => (0..count).map(|_| urn.sample_weighted(rng)).collect(),
        MemberPolicy::Distinct => {
            let target = count.min(urn.weighted_len());
            let mut members: Vec<NodeId> = Vec::with_capacity(target);
            while members.len() < target {
                let node = urn.sample_weighted(rng)?;
                if !members.contains(&node) {
                    members.push(node);
                }
            }
            Ok(members)
        }
    }
}

impl Process for HypergraphGenerator<'_> {
    type Output = Hypergraph;

    fn params(&self) -> &ParameterSet {
        self.params
    }

    fn step(&mut self, rng: &mut RngHandle) -> Result<Transition, FllError> {
        let u_insert = rng.unit();
        let u_form = rng.unit();
        let transition = if u_insert <= self.params.p() {
            self.insert(rng)?;
            Transition::Insert
        } else if self.urn.weight() == 0 {
            tracing::trace!(
                step = self.steps,
                active = self.urn.len(),
                "no weighted member for the drawn transition"
            );
            Transition::Idle
        } else if self.mode == HypergraphMode::Regular || u_form <= self.params.q() {
            self.form(rng)?;
            Transition::Form
        } else {
            self.deactivate(rng)?;
            Transition::Deactivate
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
        self.urn.check_invariants()?;
        for node in self.hypergraph.nodes() {
            let degree = self.hypergraph.degree(node)?;
            let class = self
                .urn
                .class_of(node)
                .or_else(|| self.urn.inactive_class_of(node));
            match class {
                Some(class) if class as u64 == degree => {}
                Some(class) => {
                    return Err(FllError::invariant(
                        "class-degree-mismatch",
                        "urn class differs from the node's hyperedge memberships",
                    )
                    .with_context("node", node)
                    .with_context("class", class)
                    .with_context("degree", degree))
                }
                None => {
                    return Err(FllError::invariant(
                        "untracked-node",
                        "node is neither active nor inactive",
                    )
                    .with_context("node", node))
                }
            }
        }
        Ok(())
    }

    fn into_output(self) -> Hypergraph {
        self.hypergraph
    }
}

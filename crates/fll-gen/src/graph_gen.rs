//! Pairwise-edge variant of the urn process.

use fll_core::{
    ConfigReason, FllError, NodeId, ParameterSet, ProcessKind, RngHandle, SeedingPolicy,
};
use fll_graph::Graph;

use crate::process::{Process, Transition, TransitionCounts};
use crate::urn::UrnRegistry;

/// Grows a weighted simple graph.
///
/// Each step draws `u_insert` and `u_reinforce`. With `u_insert ≤ p` a node is
/// inserted, otherwise with `u_reinforce ≤ q` a degree-weighted node `j` is
/// joined to a uniformly drawn active node `k ≠ j`, otherwise a
/// degree-weighted node is deactivated.
///
/// A reinforcement needs a node of positive degree and a second active node,
/// and a deactivation needs a node of positive degree. When the drawn
/// transition has no such node the step is recorded as [`Transition::Idle`].
/// An attaching insertion into an urn without weight enters isolated.
///
/// The run starts from `initial_nodes` nodes joined in a path, all active at
/// their path degree.
#[derive(Debug, Clone)]
pub struct GraphGenerator<'a> {
    params: &'a ParameterSet,
    seeding: SeedingPolicy,
    graph: Graph,
    urn: UrnRegistry,
    steps: u64,
    counts: TransitionCounts,
}

impl<'a> GraphGenerator<'a> {
    /// Builds the initial state. Fails unless `params` describes a graph process.
    pub fn new(params: &'a ParameterSet) -> Result<Self, FllError> {
        let seeding = match params.process() {
            ProcessKind::Graph { seeding } => *seeding,
            other => {
                return Err(FllError::config(
                    ConfigReason::KindMismatch,
                    "graph generator needs a graph parameter set",
                )
                .with_context("kind", other.label()))
            }
        };
        let initial = params.initial_nodes();
        let mut graph = Graph::with_nodes(initial);
        for index in 1..initial {
            graph.add_edge(NodeId::from_index(index - 1), NodeId::from_index(index))?;
        }
        let mut urn = UrnRegistry::new();
        for node in graph.nodes() {
            urn.insert_at(node, graph.degree(node)? as usize)?;
        }
        tracing::debug!(initial, ?seeding, "graph generator seeded with a path");
        Ok(Self {
            params,
            seeding,
            graph,
            urn,
            steps: 0,
            counts: TransitionCounts::default(),
        })
    }

    /// Graph built so far.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Urn registry of the active nodes.
    pub fn urn(&self) -> &UrnRegistry {
        &self.urn
    }

    fn insert(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let node = self.graph.add_node();
        if self.seeding == SeedingPolicy::Attach && self.urn.weight() > 0 {
            let neighbour = self.urn.sample_weighted(rng)?;
            self.urn.insert(node)?;
            self.connect(node, neighbour)
        } else {
            self.urn.insert(node)
        }
    }

    fn can_reinforce(&self) -> bool {
        self.urn.weight() > 0 && self.urn.len() >= 2
    }

    fn reinforce(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let j = self.urn.sample_weighted(rng)?;
        let k = self.urn.sample_uniform_excluding(j, rng)?;
        self.connect(j, k)
    }

    fn deactivate(&mut self, rng: &mut RngHandle) -> Result<(), FllError> {
        let j = self.urn.sample_weighted(rng)?;
        self.urn.deactivate(j)?;
        Ok(())
    }

    fn connect(&mut self, a: NodeId, b: NodeId) -> Result<(), FllError> {
        self.graph.add_edge(a, b)?;
        self.urn.promote(a)?;
        self.urn.promote(b)
    }
}

impl Process for GraphGenerator<'_> {
    type Output = Graph;

    fn params(&self) -> &ParameterSet {
        self.params
    }

    fn step(&mut self, rng: &mut RngHandle) -> Result<Transition, FllError> {
        let u_insert = rng.unit();
        let u_reinforce = rng.unit();
        let transition = if u_insert <= self.params.p() {
            self.insert(rng)?;
            Transition::Insert
        } else if u_reinforce <= self.params.q() {
            if self.can_reinforce() {
                self.reinforce(rng)?;
                Transition::Form
            } else {
                Transition::Idle
            }
        } else if self.urn.weight() > 0 {
            self.deactivate(rng)?;
            Transition::Deactivate
        } else {
            Transition::Idle
        };
        if transition == Transition::Idle {
            tracing::trace!(
                step = self.steps,
                active = self.urn.len(),
                weight = self.urn.weight(),
                "no eligible node for the drawn transition"
            );
        }
        self.steps += 1;
        self.counts.record(transition);
        Ok(transition)
    }

    fn steps(&self) -> u64 {
        self.steps
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn counts(&self) -> TransitionCounts {
        self.counts
    }

    fn check_invariants(&self) -> Result<(), FllError> {
        self.graph.check_invariants()?;
        self.urn.check_invariants()?;
        for node in self.graph.nodes() {
            if let Some(class) = self.urn.class_of(node) {
                let degree = self.graph.degree(node)?;
                if class as u64 != degree {
                    return Err(FllError::invariant(
                        "class-degree-mismatch",
                        "urn class differs from the node's degree",
                    )
                    .with_context("node", node)
                    .with_context("class", class)
                    .with_context("degree", degree));
                }
            } else if self.urn.inactive_class_of(node).is_none() {
                return Err(FllError::invariant(
                    "untracked-node",
                    "node is neither active nor inactive",
                )
                .with_context("node", node));
            }
        }
        Ok(())
    }

    fn into_output(self) -> Graph {
        self.graph
    }
}

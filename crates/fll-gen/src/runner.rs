//! Entry points that build the right generator for a parameter set and run
//! it to completion.

use fll_core::{FllError, ParameterSet, ProcessKind, RngHandle, Termination};
use fll_graph::{canonical_hash, hypergraph_hash, DegreeView, Graph, Hypergraph};
use serde::{Deserialize, Serialize};

use crate::community_gen::CommunityGenerator;
use crate::graph_gen::GraphGenerator;
use crate::hypergraph_gen::HypergraphGenerator;
use crate::process::{run_to_completion, Process, TransitionCounts};
use crate::progress::ProgressSink;

/// Structure produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// Output of the pairwise graph process.
    Graph(Graph),
    /// Output of the hypergraph and community processes.
    Hypergraph(Hypergraph),
}

impl Generated {
    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        match self {
            Generated::Graph(graph) => graph.node_count(),
            Generated::Hypergraph(hypergraph) => hypergraph.node_count(),
        }
    }

    /// Distinct edges of a graph or hyperedges of a hypergraph.
    pub fn edge_count(&self) -> usize {
        match self {
            Generated::Graph(graph) => graph.edge_count(),
            Generated::Hypergraph(hypergraph) => hypergraph.edge_count(),
        }
    }

    /// Canonical SHA-256 hash.
    pub fn hash(&self) -> String {
        match self {
            Generated::Graph(graph) => canonical_hash(graph),
            Generated::Hypergraph(hypergraph) => hypergraph_hash(hypergraph),
        }
    }

    /// The graph, if this is a graph.
    pub fn as_graph(&self) -> Option<&Graph> {
        match self {
            Generated::Graph(graph) => Some(graph),
            Generated::Hypergraph(_) => None,
        }
    }

    /// The hypergraph, if this is a hypergraph.
    pub fn as_hypergraph(&self) -> Option<&Hypergraph> {
        match self {
            Generated::Graph(_) => None,
            Generated::Hypergraph(hypergraph) => Some(hypergraph),
        }
    }
}

impl DegreeView for Generated {
    fn node_count(&self) -> usize {
        Generated::node_count(self)
    }

    fn degree_of(&self, index: usize) -> u64 {
        match self {
            Generated::Graph(graph) => graph.degrees()[index],
            Generated::Hypergraph(hypergraph) => hypergraph.degrees()[index],
        }
    }
}

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Process label (`graph`, `hypergraph-cutoff`, ...).
    pub process: String,
    /// Seed the run's RNG was created from.
    pub seed: u64,
    /// Steps executed.
    pub steps: u64,
    /// Why the run stopped.
    pub termination: Termination,
    /// Final node count.
    pub nodes: usize,
    /// Final edge (graph) or hyperedge (hypergraph) count.
    pub edges: usize,
    /// Insertion steps.
    pub insertions: u64,
    /// Formation steps.
    pub formations: u64,
    /// Deactivation steps.
    pub deactivations: u64,
    /// Steps whose drawn transition had no eligible node.
    #[serde(default)]
    pub idle: u64,
    /// Canonical hash of the output.
    pub graph_hash: String,
}

/// Output of a run together with its summary.
#[derive(Debug, Clone)]
pub struct Realization {
    /// Generated structure.
    pub output: Generated,
    /// Run summary.
    pub summary: RunSummary,
}

/// Runs the process described by `params` from `seed` to completion.
pub fn run<S>(params: &ParameterSet, seed: u64, sink: &mut S) -> Result<Realization, FllError>
where
    S: ProgressSink + ?Sized,
{
    let mut rng = RngHandle::from_seed(seed);
    let (output, steps, termination, counts) = match params.process() {
        ProcessKind::Graph { .. } => {
            let generator = GraphGenerator::new(params)?;
            drive(generator, &mut rng, sink, Generated::Graph)?
        }
        ProcessKind::Hypergraph { .. } => {
            let generator = HypergraphGenerator::new(params)?;
            drive(generator, &mut rng, sink, Generated::Hypergraph)?
        }
        ProcessKind::Community(_) => {
            let generator = CommunityGenerator::new(params)?;
            drive(generator, &mut rng, sink, Generated::Hypergraph)?
        }
    };
    let summary = RunSummary {
        process: params.process().label().to_string(),
        seed,
        steps,
        termination,
        nodes: output.node_count(),
        edges: output.edge_count(),
        insertions: counts.insertions,
        formations: counts.formations,
        deactivations: counts.deactivations,
        idle: counts.idle,
        graph_hash: output.hash(),
    };
    tracing::debug!(
        process = %summary.process,
        seed,
        steps,
        nodes = summary.nodes,
        edges = summary.edges,
        "run finished"
    );
    Ok(Realization { output, summary })
}

fn drive<P, S>(
    mut process: P,
    rng: &mut RngHandle,
    sink: &mut S,
    wrap: fn(P::Output) -> Generated,
) -> Result<(Generated, u64, Termination, TransitionCounts), FllError>
where
    P: Process,
    S: ProgressSink + ?Sized,
{
    let termination = run_to_completion(&mut process, rng, sink)?;
    let steps = process.steps();
    let counts = process.counts();
    Ok((wrap(process.into_output()), steps, termination, counts))
}

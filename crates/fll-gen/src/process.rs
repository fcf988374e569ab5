//! Step-driven process abstraction shared by every generator.

use fll_core::{FllError, ParameterSet, RngHandle, Termination};
use serde::{Deserialize, Serialize};

use crate::progress::{ProgressSink, PROGRESS_INTERVAL};

/// Transition executed by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    /// A node was inserted (possibly together with its seeding edge).
    Insert,
    /// An edge or hyperedge was formed among existing nodes.
    Form,
    /// An active node was deactivated.
    Deactivate,
    /// The drawn transition had no eligible node, so the state is unchanged.
    Idle,
}

/// Number of steps per transition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransitionCounts {
    /// Node insertions.
    pub insertions: u64,
    /// Edge or hyperedge formations.
    pub formations: u64,
    /// Deactivations.
    pub deactivations: u64,
    /// Steps whose drawn transition could not apply.
    #[serde(default)]
    pub idle: u64,
}

impl TransitionCounts {
    /// Records one transition.
    pub fn record(&mut self, transition: Transition) {
        match transition {
            Transition::Insert => self.insertions += 1,
            Transition::Form => self.formations += 1,
            Transition::Deactivate => self.deactivations += 1,
            Transition::Idle => self.idle += 1,
        }
    }

    /// Total number of recorded transitions.
    pub fn total(&self) -> u64 {
        self.insertions + self.formations + self.deactivations + self.idle
    }
}

/// A growth process advanced one step at a time.
///
/// Callers that need to cancel or inspect a run between steps drive
/// [`Process::step`] themselves; everyone else uses [`run_to_completion`].
pub trait Process {
    /// Structure handed back once the run is over.
    type Output;

    /// Parameters the process was built from.
    fn params(&self) -> &ParameterSet;

    /// Executes exactly one step.
    fn step(&mut self, rng: &mut RngHandle) -> Result<Transition, FllError>;

    /// Steps executed so far.
    fn steps(&self) -> u64;

    /// Current node count.
    fn node_count(&self) -> usize;

    /// Current edge count reported to progress sinks.
    fn edge_count(&self) -> usize;

    /// Transition tally so far.
    fn counts(&self) -> TransitionCounts;

    /// Verifies every internal invariant of the process state.
    fn check_invariants(&self) -> Result<(), FllError>;

    /// Consumes the process and returns the generated structure.
    fn into_output(self) -> Self::Output;

    /// Termination reason for the current state, if the run is over.
    fn termination(&self) -> Option<Termination> {
        self.params().termination(self.node_count(), self.steps())
    }
}

/// Steps `process` until its termination predicate holds.
pub fn run_to_completion<P, S>(
    process: &mut P,
    rng: &mut RngHandle,
    sink: &mut S,
) -> Result<Termination, FllError>
where
    P: Process + ?Sized,
    S: ProgressSink + ?Sized,
{
    loop {
        if let Some(reason) = process.termination() {
            tracing::debug!(
                ?reason,
                steps = process.steps(),
                nodes = process.node_count(),
                edges = process.edge_count(),
                "process terminated"
            );
            return Ok(reason);
        }
        process.step(rng)?;
        let steps = process.steps();
        if steps % PROGRESS_INTERVAL == 0 {
            sink.on_progress(steps, process.node_count(), process.edge_count());
        }
    }
}

//! Progress notifications emitted while a process runs.

/// Number of steps between two progress notifications.
pub const PROGRESS_INTERVAL: u64 = 1_000;

/// Receives `(steps, nodes, edges)` every [`PROGRESS_INTERVAL`] steps.
///
/// Sinks observe the run; they cannot influence it. For pairwise graphs
/// `edges` counts distinct node pairs, for hypergraphs it counts hyperedges.
pub trait ProgressSink {
    /// Called synchronously from the step loop.
    fn on_progress(&mut self, steps: u64, nodes: usize, edges: usize);
}

/// Sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&mut self, _steps: u64, _nodes: usize, _edges: usize) {}
}

/// Sink that logs every notification at `info` level.
#[derive(Debug, Clone, Default)]
pub struct TracingProgress {
    label: String,
}

impl TracingProgress {
    /// Creates a sink whose events carry `label` (usually the process kind).
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressSink for TracingProgress {
    fn on_progress(&mut self, steps: u64, nodes: usize, edges: usize) {
        tracing::info!(process = %self.label, steps, nodes, edges, "progress");
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(u64, usize, usize),
{
    fn on_progress(&mut self, steps: u64, nodes: usize, edges: usize) {
        self(steps, nodes, edges)
    }
}

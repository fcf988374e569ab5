#![deny(missing_docs)]
#![doc = "Fenner–Levene–Loizou urn processes: degree-class urns, the graph, hypergraph and community generators, and batch runs with persisted artefacts."]

/// Per-realization artefacts and batch execution.
pub mod artifacts;
/// Community-partitioned hypergraph process.
pub mod community_gen;
/// YAML run configuration.
pub mod config;
/// Realization seed derivation.
pub mod determinism;
/// Pairwise graph process.
pub mod graph_gen;
/// Regular and cutoff hypergraph processes.
pub mod hypergraph_gen;
/// Batch manifest serialization.
pub mod manifest;
/// Step-driven process trait and driver loop.
pub mod process;
/// Progress sinks.
pub mod progress;
/// Generator dispatch and run summaries.
pub mod runner;
/// Degree-class urn registry.
pub mod urn;

pub use artifacts::{run_batch, write_realization, CommunityAssignments};
pub use community_gen::CommunityGenerator;
pub use config::{OutputConfig, RunConfig, SeedPolicy};
pub use graph_gen::GraphGenerator;
pub use hypergraph_gen::HypergraphGenerator;
pub use manifest::RunManifest;
pub use process::{run_to_completion, Process, Transition, TransitionCounts};
pub use progress::{NoopProgress, ProgressSink, TracingProgress, PROGRESS_INTERVAL};
pub use runner::{run, Generated, Realization, RunSummary};
pub use urn::UrnRegistry;

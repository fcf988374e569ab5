//! Files written for each realization of a batch.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use fll_core::{FllError, ParameterSet, RunProvenance};
use fll_graph::{degree_histogram, write_edge_list, write_hyperedge_list, DegreeView};
use serde::{Deserialize, Serialize};

use crate::config::{OutputConfig, RunConfig};
use crate::determinism::{realization_dir_name, realization_seed};
use crate::manifest::{tool_versions, RealizationRecord, RunManifest};
use crate::progress::TracingProgress;
use crate::runner::{run, Generated, Realization};

/// Community assignments as persisted next to a hyperedge list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityAssignments {
    /// Number of communities.
    pub count: usize,
    /// Community of every node, indexed by node id.
    pub assignments: Vec<usize>,
}

/// Writes the edge or hyperedge list, the degree CSV, community assignments
/// when present, and the summary into `dir`. Returns the written paths.
pub fn write_realization(
    dir: &Path,
    realization: &Realization,
    output: &OutputConfig,
) -> Result<Vec<PathBuf>, FllError> {
    fs::create_dir_all(dir).map_err(|err| {
        FllError::serde("artifact-mkdir", err.to_string()).with_context("path", dir.display())
    })?;
    let mut written = Vec::new();

    let edges_path = dir.join(&output.edge_list_file);
    let writer = BufWriter::new(create(&edges_path)?);
    match &realization.output {
        Generated::Graph(graph) => write_edge_list(graph, writer)?,
        Generated::Hypergraph(hypergraph) => write_hyperedge_list(hypergraph, writer)?,
    }
    written.push(edges_path);

    let degrees_path = dir.join(&output.degrees_file);
    write_degree_csv(&degrees_path, &realization.output)?;
    written.push(degrees_path);

    if let Some(partition) = realization
        .output
        .as_hypergraph()
        .and_then(|hypergraph| hypergraph.communities())
    {
        let communities_path = dir.join(&output.communities_file);
        write_json(
            &communities_path,
            &CommunityAssignments {
                count: partition.count(),
                assignments: partition.assignments().to_vec(),
            },
        )?;
        written.push(communities_path);
    }

    let summary_path = dir.join(&output.summary_file);
    write_json(&summary_path, &realization.summary)?;
    written.push(summary_path);
    Ok(written)
}

/// Writes `degree,count` rows in ascending degree order.
pub fn write_degree_csv<G: DegreeView + ?Sized>(path: &Path, view: &G) -> Result<(), FllError> {
    let mut writer = csv::Writer::from_path(path).map_err(|err| wrap_csv(path, err))?;
    writer
        .write_record(["degree", "count"])
        .map_err(|err| wrap_csv(path, err))?;
    for (degree, count) in degree_histogram(view) {
        writer
            .write_record([degree.to_string(), count.to_string()])
            .map_err(|err| wrap_csv(path, err))?;
    }
    writer.flush().map_err(|err| {
        FllError::serde("degree-csv", err.to_string()).with_context("path", path.display())
    })
}

/// Serializes `value` as pretty JSON into `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FllError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            FllError::serde("artifact-mkdir", err.to_string())
                .with_context("path", parent.display())
        })?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| FllError::serde("artifact-serialize", err.to_string()))?;
    fs::write(path, json).map_err(|err| {
        FllError::serde("artifact-write", err.to_string()).with_context("path", path.display())
    })
}

/// Runs every realization of `config` and writes its artefacts under `root`.
///
/// Parameters are validated once before the first run. Realization `i` runs
/// from the seed derived from `(master_seed, i)`, where `master_seed`
/// overrides the configured one when given.
pub fn run_batch(
    config: &RunConfig,
    root: &Path,
    master_seed: Option<u64>,
) -> Result<RunManifest, FllError> {
    let params: ParameterSet = config.validate()?;
    let master_seed = master_seed.unwrap_or(config.seed_policy.master_seed);
    let mut records = Vec::with_capacity(config.realizations);
    for index in 0..config.realizations {
        let seed = realization_seed(master_seed, index);
        let label = format!("{}#{index}", params.process().label());
        let realization = run(&params, seed, &mut TracingProgress::new(label))?;
        let directory = PathBuf::from(realization_dir_name(index));
        write_realization(&root.join(&directory), &realization, &config.output)?;
        tracing::info!(
            realization = index,
            seed,
            steps = realization.summary.steps,
            nodes = realization.summary.nodes,
            edges = realization.summary.edges,
            "realization written"
        );
        records.push(RealizationRecord {
            directory,
            provenance: RunProvenance {
                graph_hash: realization.summary.graph_hash.clone(),
                seed,
                realization: index as u64,
                created_at: timestamp(),
                tool_versions: tool_versions(),
            },
            summary: realization.summary,
        });
    }
    let manifest = RunManifest {
        config: config.clone(),
        master_seed,
        seed_label: config.seed_policy.label.clone(),
        created_at: timestamp(),
        realizations: records,
    };
    manifest.write(&root.join(&config.output.manifest_file))?;
    Ok(manifest)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn create(path: &Path) -> Result<File, FllError> {
    File::create(path).map_err(|err| {
        FllError::serde("artifact-create", err.to_string()).with_context("path", path.display())
    })
}

fn wrap_csv(path: &Path, err: csv::Error) -> FllError {
    FllError::serde("degree-csv", "CSV write failure")
        .with_context("path", path.display())
        .with_hint(err.to_string())
}

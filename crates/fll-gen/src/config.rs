use std::fs;
use std::path::{Path, PathBuf};

use fll_core::{FllError, ParameterSet, ParameterSpec};
use serde::{Deserialize, Serialize};

/// YAML-configurable description of a batch of independent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Process parameters, validated before any run starts.
    pub params: ParameterSpec,
    /// Master seed and label.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Number of independent realizations.
    #[serde(default = "default_realizations")]
    pub realizations: usize,
    /// Output file names.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_realizations() -> usize {
    1
}

impl RunConfig {
    /// Creates a single-realization config with default seeding and output.
    pub fn new(params: ParameterSpec) -> Self {
        Self {
            params,
            seed_policy: SeedPolicy::default(),
            realizations: default_realizations(),
            output: OutputConfig::default(),
        }
    }

    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, FllError> {
        serde_yaml::from_str(yaml).map_err(|err| FllError::serde("config-parse", err.to_string()))
    }

    /// Reads and parses a YAML file.
    pub fn load(path: &Path) -> Result<Self, FllError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            FllError::serde("config-read", err.to_string())
                .with_context("path", path.display())
        })?;
        Self::from_yaml(&contents).map_err(|err| err.with_context("path", path.display()))
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<ParameterSet, FllError> {
        self.params.validate()
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed from which every realization seed is derived.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x0F11_5EED_0F11_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// File names of the artefacts written for each realization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Edge list (graphs) or hyperedge list (hypergraphs).
    #[serde(default = "default_edge_list_file")]
    pub edge_list_file: PathBuf,
    /// Degree distribution CSV.
    #[serde(default = "default_degrees_file")]
    pub degrees_file: PathBuf,
    /// Community assignments JSON (community process only).
    #[serde(default = "default_communities_file")]
    pub communities_file: PathBuf,
    /// Run summary JSON.
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,
    /// Batch manifest JSON, written once at the output root.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
}

fn default_edge_list_file() -> PathBuf {
    PathBuf::from("edges.txt")
}

fn default_degrees_file() -> PathBuf {
    PathBuf::from("degrees.csv")
}

fn default_communities_file() -> PathBuf {
    PathBuf::from("communities.json")
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("summary.json")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            edge_list_file: default_edge_list_file(),
            degrees_file: default_degrees_file(),
            communities_file: default_communities_file(),
            summary_file: default_summary_file(),
            manifest_file: default_manifest_file(),
        }
    }
}

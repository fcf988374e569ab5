use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use fll_core::{FllError, RunProvenance};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::runner::RunSummary;

/// One realization as recorded in a batch manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizationRecord {
    /// Directory holding the realization's artefacts, relative to the root.
    pub directory: PathBuf,
    /// Summary of the run.
    pub summary: RunSummary,
    /// Provenance of the persisted structure.
    pub provenance: RunProvenance,
}

/// Structured manifest describing a completed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the batch.
    pub config: RunConfig,
    /// Master seed realization seeds were derived from.
    pub master_seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// RFC 3339 timestamp of manifest creation.
    pub created_at: String,
    /// One record per realization, in index order.
    pub realizations: Vec<RealizationRecord>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), FllError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                FllError::serde("manifest-mkdir", err.to_string())
                    .with_context("path", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            FllError::serde("manifest-serialize", err.to_string())
                .with_context("path", path.display())
        })?;
        fs::write(path, json).map_err(|err| {
            FllError::serde("manifest-write", err.to_string()).with_context("path", path.display())
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, FllError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            FllError::serde("manifest-read", err.to_string()).with_context("path", path.display())
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            FllError::serde("manifest-parse", err.to_string()).with_context("path", path.display())
        })
    }
}

/// Versions of the crates that produced an artefact.
pub fn tool_versions() -> BTreeMap<String, String> {
    let mut versions = BTreeMap::new();
    versions.insert("fll-gen".to_string(), env!("CARGO_PKG_VERSION").to_string());
    versions
}

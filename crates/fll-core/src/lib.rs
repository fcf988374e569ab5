#![deny(missing_docs)]
#![doc = "Core types for the FLL preferential-attachment generators: identifiers, the validated parameter set, the error surface and the deterministic RNG handle."]

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod params;
pub mod provenance;
pub mod rng;

pub use errors::{ConfigError, ConfigReason, ErrorInfo, FllError};
pub use params::{
    CardinalityDistribution, CommunitySpec, HypergraphMode, MemberPolicy, ParameterSet,
    ParameterSpec, ProcessKind, SeedingPolicy, Termination, NORMALIZATION_TOLERANCE,
};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};

/// Identifier of a node. Assigned densely in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }

    /// Creates the identifier of the node stored at `index`.
    pub fn from_index(index: usize) -> Self {
        Self(index as u64)
    }

    /// Position of the node in dense per-node arrays.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an edge or hyperedge, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

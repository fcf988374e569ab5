//! Structured error types shared across FLL crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`FllError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (counts, offending values, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Enumerated reason attached to every configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigReason {
    /// A probability lies outside its declared interval.
    ProbabilityOutOfRange,
    /// The growth condition `p > (1-p)(1-q)` does not hold.
    StabilityViolated,
    /// The initial node count exceeds the target node count.
    InitialExceedsTarget,
    /// Fewer initial nodes than the seed structure requires.
    InitialTooSmall,
    /// Fewer initial nodes than communities.
    InitialBelowCommunities,
    /// Neither a target node count nor a step cap was supplied.
    MissingTermination,
    /// A probability vector or matrix does not sum to one.
    NotNormalized,
    /// Matrix or vector dimensions disagree with the community count.
    DimensionMismatch,
    /// The hyperedge cardinality distribution is empty or contains zero.
    InvalidCardinality,
    /// The community exploration constant is not a positive finite number.
    InvalidExploration,
    /// A transition without defined semantics was given non-zero probability.
    UnsupportedTransition,
    /// The parameter set was built for a different process kind.
    KindMismatch,
}

impl ConfigReason {
    /// Returns the stable code used in [`ErrorInfo::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ConfigReason::ProbabilityOutOfRange => "probability-out-of-range",
            ConfigReason::StabilityViolated => "stability-violated",
            ConfigReason::InitialExceedsTarget => "initial-exceeds-target",
            ConfigReason::InitialTooSmall => "initial-too-small",
            ConfigReason::InitialBelowCommunities => "initial-below-communities",
            ConfigReason::MissingTermination => "missing-termination",
            ConfigReason::NotNormalized => "not-normalized",
            ConfigReason::DimensionMismatch => "dimension-mismatch",
            ConfigReason::InvalidCardinality => "invalid-cardinality",
            ConfigReason::InvalidExploration => "invalid-exploration",
            ConfigReason::UnsupportedTransition => "unsupported-transition",
            ConfigReason::KindMismatch => "kind-mismatch",
        }
    }
}

impl Display for ConfigReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Rejected parameter set: the reason code plus a diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigError {
    /// Which constraint failed.
    pub reason: ConfigReason,
    /// Message and offending values.
    pub info: ErrorInfo,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info.fmt(f)
    }
}

/// Canonical error type for the FLL generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum FllError {
    /// Invalid parameter set, raised before any simulation work.
    #[error("configuration error: {0}")]
    Config(ConfigError),
    /// Internal bookkeeping diverged; the run must be aborted.
    #[error("invariant violation: {0}")]
    Invariant(ErrorInfo),
    /// Graph and hypergraph structural errors.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Serialization, parsing and I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl FllError {
    /// Builds a configuration error whose code mirrors `reason`.
    pub fn config(reason: ConfigReason, message: impl Into<String>) -> Self {
        FllError::Config(ConfigError {
            reason,
            info: ErrorInfo::new(reason.code(), message),
        })
    }

    /// Builds an invariant violation.
    pub fn invariant(code: impl Into<String>, message: impl Into<String>) -> Self {
        FllError::Invariant(ErrorInfo::new(code, message))
    }

    /// Builds a structural graph error.
    pub fn graph(code: impl Into<String>, message: impl Into<String>) -> Self {
        FllError::Graph(ErrorInfo::new(code, message))
    }

    /// Builds a serialization error.
    pub fn serde(code: impl Into<String>, message: impl Into<String>) -> Self {
        FllError::Serde(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            FllError::Config(err) => &err.info,
            FllError::Invariant(info) | FllError::Graph(info) | FllError::Serde(info) => info,
        }
    }

    /// Returns the configuration reason, if this is a configuration error.
    pub fn config_reason(&self) -> Option<ConfigReason> {
        match self {
            FllError::Config(err) => Some(err.reason),
            _ => None,
        }
    }

    /// Adds a context entry to the payload regardless of family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            FllError::Config(err) => FllError::Config(ConfigError {
                reason: err.reason,
                info: err.info.with_context(key, value),
            }),
            FllError::Invariant(info) => FllError::Invariant(info.with_context(key, value)),
            FllError::Graph(info) => FllError::Graph(info.with_context(key, value)),
            FllError::Serde(info) => FllError::Serde(info.with_context(key, value)),
        }
    }

    /// Sets a remediation hint regardless of family.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            FllError::Config(err) => FllError::Config(ConfigError {
                reason: err.reason,
                info: err.info.with_hint(hint),
            }),
            FllError::Invariant(info) => FllError::Invariant(info.with_hint(hint)),
            FllError::Graph(info) => FllError::Graph(info.with_hint(hint)),
            FllError::Serde(info) => FllError::Serde(info.with_hint(hint)),
        }
    }
}

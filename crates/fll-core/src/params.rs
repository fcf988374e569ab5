//! Parameter sets for the preferential-attachment processes and their
//! validation gate.
//!
//! A [`ParameterSpec`] is plain data (it is what YAML run configurations
//! deserialize into). [`ParameterSpec::validate`] either rejects it with a
//! [`ConfigReason`] or returns an immutable [`ParameterSet`] that generators
//! borrow for the whole run. Nothing is clamped: every out-of-contract value
//! is an error.

use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigReason, FllError};
use crate::rng::RngHandle;

/// Absolute tolerance used when checking that probabilities sum to one.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// What happens to the edges of a node right after it is inserted into a
/// pairwise graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedingPolicy {
    /// The node enters at degree zero and waits to be chosen as a neighbour.
    Isolated,
    /// The node immediately attaches to one degree-weighted active node.
    Attach,
}

/// Flavour of the hypergraph process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HypergraphMode {
    /// Insert or form a hyperedge; nodes never leave the active set.
    Regular,
    /// Insert, form a hyperedge with probability `q`, otherwise deactivate.
    Cutoff,
}

/// Whether one hyperedge may contain the same node more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MemberPolicy {
    /// Every member is an independent draw; repeats are kept.
    #[default]
    WithReplacement,
    /// Repeated draws are rejected; the cardinality is clamped to the number
    /// of eligible nodes.
    Distinct,
}

/// Community structure of the community hypergraph process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySpec {
    /// Probability that an inserted node joins each community.
    pub membership: Vec<f64>,
    /// Row-major C×C matrix of probabilities for the community pair spanned
    /// by a new hyperedge.
    pub collaboration: Vec<Vec<f64>>,
    /// Exploration constant γ of the mixed member selection.
    #[serde(default = "default_exploration")]
    pub exploration: f64,
    /// Probability of inserting a node together with a hyperedge. This
    /// transition has no defined semantics and must stay zero.
    #[serde(default)]
    pub joint_insert_probability: f64,
}

fn default_exploration() -> f64 {
    1.0
}

impl CommunitySpec {
    /// Creates a community spec with default exploration and no joint insertion.
    pub fn new(membership: Vec<f64>, collaboration: Vec<Vec<f64>>) -> Self {
        Self {
            membership,
            collaboration,
            exploration: default_exploration(),
            joint_insert_probability: 0.0,
        }
    }

    /// Number of communities declared by the membership vector.
    pub fn count(&self) -> usize {
        self.membership.len()
    }
}

/// Which process the parameter set drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProcessKind {
    /// Simple weighted graph with pairwise edges.
    Graph {
        /// Edge behaviour on insertion. Required: there is no default.
        seeding: SeedingPolicy,
    },
    /// Hypergraph with variable-arity hyperedges.
    Hypergraph {
        /// Regular or cutoff flavour.
        mode: HypergraphMode,
    },
    /// Hypergraph whose hyperedges span one or two communities.
    Community(CommunitySpec),
}

impl ProcessKind {
    /// Short label used in logs and manifests.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessKind::Graph { .. } => "graph",
            ProcessKind::Hypergraph {
                mode: HypergraphMode::Regular,
            } => "hypergraph-regular",
            ProcessKind::Hypergraph {
                mode: HypergraphMode::Cutoff,
            } => "hypergraph-cutoff",
            ProcessKind::Community(_) => "community",
        }
    }

    fn uses_cardinality(&self) -> bool {
        !matches!(self, ProcessKind::Graph { .. })
    }
}

/// Discrete distribution over hyperedge (or sub-hyperedge) cardinalities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardinalityDistribution {
    /// Possible cardinalities.
    pub sizes: Vec<usize>,
    /// Probability of each entry of `sizes`.
    pub weights: Vec<f64>,
}

impl CardinalityDistribution {
    /// Uniform distribution over the given sizes.
    pub fn uniform(sizes: Vec<usize>) -> Self {
        let weight = if sizes.is_empty() {
            0.0
        } else {
            1.0 / sizes.len() as f64
        };
        let weights = vec![weight; sizes.len()];
        Self { sizes, weights }
    }

    /// Distribution that always yields `size`.
    pub fn fixed(size: usize) -> Self {
        Self {
            sizes: vec![size],
            weights: vec![1.0],
        }
    }

    /// Largest cardinality with non-zero probability.
    pub fn max_size(&self) -> usize {
        self.sizes
            .iter()
            .zip(&self.weights)
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(size, _)| *size)
            .max()
            .unwrap_or(0)
    }
}

impl Default for CardinalityDistribution {
    fn default() -> Self {
        Self::uniform(vec![3, 4, 5])
    }
}

/// Raw, unvalidated description of a process run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Probability of a node insertion at each step, in `(0, 1)`.
    pub p: f64,
    /// Probability of edge formation given no insertion, in `(0, 1]`.
    #[serde(default = "default_q")]
    pub q: f64,
    /// Number of nodes in the initial state.
    pub initial_nodes: usize,
    /// Stop once the node count reaches this value.
    #[serde(default)]
    pub target_nodes: Option<usize>,
    /// Stop once this many steps were executed.
    #[serde(default)]
    pub max_steps: Option<u64>,
    /// Process to run.
    pub process: ProcessKind,
    /// Hyperedge cardinality distribution (ignored by pairwise graphs).
    #[serde(default)]
    pub cardinality: CardinalityDistribution,
    /// Member repetition policy for hyperedges.
    #[serde(default)]
    pub member_policy: MemberPolicy,
}

fn default_q() -> f64 {
    1.0
}

impl ParameterSpec {
    /// Pairwise graph process.
    pub fn graph(p: f64, q: f64, initial_nodes: usize, seeding: SeedingPolicy) -> Self {
        Self::with_process(p, q, initial_nodes, ProcessKind::Graph { seeding })
    }

    /// Hypergraph process in the given mode.
    pub fn hypergraph(p: f64, q: f64, initial_nodes: usize, mode: HypergraphMode) -> Self {
        Self::with_process(p, q, initial_nodes, ProcessKind::Hypergraph { mode })
    }

    /// Community hypergraph process.
    pub fn community(p: f64, initial_nodes: usize, communities: CommunitySpec) -> Self {
        Self::with_process(p, 1.0, initial_nodes, ProcessKind::Community(communities))
    }

    fn with_process(p: f64, q: f64, initial_nodes: usize, process: ProcessKind) -> Self {
        Self {
            p,
            q,
            initial_nodes,
            target_nodes: None,
            max_steps: None,
            process,
            cardinality: CardinalityDistribution::default(),
            member_policy: MemberPolicy::default(),
        }
    }

    /// Sets the target node count.
    pub fn with_target_nodes(mut self, target: usize) -> Self {
        self.target_nodes = Some(target);
        self
    }

    /// Sets the step cap.
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Replaces the cardinality distribution.
    pub fn with_cardinality(mut self, cardinality: CardinalityDistribution) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Replaces the member policy.
    pub fn with_member_policy(mut self, policy: MemberPolicy) -> Self {
        self.member_policy = policy;
        self
    }

    /// Checks every constraint and freezes the parameters into a [`ParameterSet`].
    ///
    /// Checks run in a fixed order, so the same spec always fails with the
    /// same reason.
    pub fn validate(&self) -> Result<ParameterSet, FllError> {
        check_open_unit("p", self.p)?;
        if !(self.q.is_finite() && self.q > 0.0 && self.q <= 1.0) {
            return Err(
                FllError::config(ConfigReason::ProbabilityOutOfRange, "q must lie in (0, 1]")
                    .with_context("q", self.q),
            );
        }
        let shrink = (1.0 - self.p) * (1.0 - self.q);
        if self.p <= shrink {
            return Err(FllError::config(
                ConfigReason::StabilityViolated,
                "p > (1-p)(1-q) must hold",
            )
            .with_context("p", self.p)
            .with_context("q", self.q)
            .with_context("(1-p)(1-q)", shrink));
        }
        if self.target_nodes.is_none() && self.max_steps.is_none() {
            return Err(FllError::config(
                ConfigReason::MissingTermination,
                "either target_nodes or max_steps must be supplied",
            ));
        }

        let community_count = match &self.process {
            ProcessKind::Community(spec) => Some(spec.count()),
            _ => None,
        };
        match community_count {
            Some(count) => {
                if count > 0 && self.initial_nodes < count {
                    return Err(FllError::config(
                        ConfigReason::InitialBelowCommunities,
                        "initial_nodes must be at least the number of communities",
                    )
                    .with_context("initial_nodes", self.initial_nodes)
                    .with_context("communities", count));
                }
            }
            None => {
                if self.initial_nodes < 2 {
                    return Err(FllError::config(
                        ConfigReason::InitialTooSmall,
                        "the seed structure needs at least two initial nodes",
                    )
                    .with_context("initial_nodes", self.initial_nodes));
                }
            }
        }
        if let Some(target) = self.target_nodes {
            if self.initial_nodes > target {
                return Err(FllError::config(
                    ConfigReason::InitialExceedsTarget,
                    "initial_nodes must not exceed target_nodes",
                )
                .with_context("initial_nodes", self.initial_nodes)
                .with_context("target_nodes", target));
            }
        }

        let cardinality = if self.process.uses_cardinality() {
            Some(validate_cardinality(&self.cardinality)?)
        } else {
            None
        };
        let community = match &self.process {
            ProcessKind::Community(spec) => Some(validate_communities(spec, self.initial_nodes)?),
            _ => None,
        };

        Ok(ParameterSet {
            spec: self.clone(),
            cardinality,
            community,
        })
    }
}

fn check_open_unit(name: &str, value: f64) -> Result<(), FllError> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(FllError::config(
            ConfigReason::ProbabilityOutOfRange,
            format!("{name} must lie in (0, 1)"),
        )
        .with_context(name, value))
    }
}

fn check_probabilities(name: &str, values: &[f64]) -> Result<(), FllError> {
    if let Some((idx, value)) = values
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite() || **value < 0.0)
    {
        return Err(FllError::config(
            ConfigReason::ProbabilityOutOfRange,
            format!("{name} entries must be finite and non-negative"),
        )
        .with_context("index", idx)
        .with_context("value", value));
    }
    let total: f64 = values.iter().sum();
    if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
        return Err(FllError::config(
            ConfigReason::NotNormalized,
            format!("{name} must sum to 1"),
        )
        .with_context("sum", total));
    }
    Ok(())
}

fn weighted_index(name: &str, values: &[f64]) -> Result<WeightedIndex<f64>, FllError> {
    WeightedIndex::new(values.iter().copied()).map_err(|err| {
        FllError::config(ConfigReason::NotNormalized, format!("{name}: {err}"))
    })
}

fn validate_cardinality(dist: &CardinalityDistribution) -> Result<WeightedIndex<f64>, FllError> {
    if dist.sizes.is_empty() {
        return Err(FllError::config(
            ConfigReason::InvalidCardinality,
            "cardinality distribution must not be empty",
        ));
    }
    if dist.sizes.len() != dist.weights.len() {
        return Err(FllError::config(
            ConfigReason::DimensionMismatch,
            "cardinality sizes and weights must have the same length",
        )
        .with_context("sizes", dist.sizes.len())
        .with_context("weights", dist.weights.len()));
    }
    if dist.sizes.contains(&0) {
        return Err(FllError::config(
            ConfigReason::InvalidCardinality,
            "hyperedge cardinalities must be positive",
        ));
    }
    check_probabilities("cardinality weights", &dist.weights)?;
    weighted_index("cardinality weights", &dist.weights)
}

fn validate_communities(
    spec: &CommunitySpec,
    initial_nodes: usize,
) -> Result<CommunitySamplers, FllError> {
    let count = spec.count();
    if count == 0 {
        return Err(FllError::config(
            ConfigReason::DimensionMismatch,
            "at least one community is required",
        ));
    }
    check_probabilities("membership", &spec.membership)?;
    if spec.collaboration.len() != count {
        return Err(FllError::config(
            ConfigReason::DimensionMismatch,
            "collaboration matrix must have one row per community",
        )
        .with_context("rows", spec.collaboration.len())
        .with_context("communities", count));
    }
    if let Some((row, values)) = spec
        .collaboration
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != count)
    {
        return Err(FllError::config(
            ConfigReason::DimensionMismatch,
            "collaboration matrix must be square",
        )
        .with_context("row", row)
        .with_context("columns", values.len())
        .with_context("communities", count));
    }
    let flattened: Vec<f64> = spec.collaboration.iter().flatten().copied().collect();
    check_probabilities("collaboration", &flattened)?;
    if !(spec.exploration.is_finite() && spec.exploration > 0.0) {
        return Err(FllError::config(
            ConfigReason::InvalidExploration,
            "exploration must be a positive finite number",
        )
        .with_context("exploration", spec.exploration));
    }
    if spec.joint_insert_probability != 0.0 {
        return Err(FllError::config(
            ConfigReason::UnsupportedTransition,
            "joint node-and-edge insertion has no defined semantics; its probability must be 0",
        )
        .with_context("joint_insert_probability", spec.joint_insert_probability)
        .with_hint("set joint_insert_probability to 0"));
    }
    debug_assert!(initial_nodes >= count);
    Ok(CommunitySamplers {
        count,
        membership: weighted_index("membership", &spec.membership)?,
        pairs: weighted_index("collaboration", &flattened)?,
        exploration: spec.exploration,
        joint_insert_probability: spec.joint_insert_probability,
    })
}

#[derive(Debug, Clone)]
struct CommunitySamplers {
    count: usize,
    membership: WeightedIndex<f64>,
    pairs: WeightedIndex<f64>,
    exploration: f64,
    joint_insert_probability: f64,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// The node count reached `target_nodes`.
    TargetNodes,
    /// The step count reached `max_steps`.
    StepCap,
}

/// Validated, immutable parameter set.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    spec: ParameterSpec,
    cardinality: Option<WeightedIndex<f64>>,
    community: Option<CommunitySamplers>,
}

impl ParameterSet {
    /// The parameters this set was validated from.
    pub fn spec(&self) -> &ParameterSpec {
        &self.spec
    }

    /// Insertion probability.
    pub fn p(&self) -> f64 {
        self.spec.p
    }

    /// Edge formation probability given no insertion.
    pub fn q(&self) -> f64 {
        self.spec.q
    }

    /// Initial node count.
    pub fn initial_nodes(&self) -> usize {
        self.spec.initial_nodes
    }

    /// Target node count, if configured.
    pub fn target_nodes(&self) -> Option<usize> {
        self.spec.target_nodes
    }

    /// Step cap, if configured.
    pub fn max_steps(&self) -> Option<u64> {
        self.spec.max_steps
    }

    /// Process kind.
    pub fn process(&self) -> &ProcessKind {
        &self.spec.process
    }

    /// Member repetition policy.
    pub fn member_policy(&self) -> MemberPolicy {
        self.spec.member_policy
    }

    /// Termination predicate. The node target is checked before the step cap.
    pub fn termination(&self, nodes: usize, steps: u64) -> Option<Termination> {
        if self.spec.target_nodes.is_some_and(|target| nodes >= target) {
            return Some(Termination::TargetNodes);
        }
        if self.spec.max_steps.is_some_and(|cap| steps >= cap) {
            return Some(Termination::StepCap);
        }
        None
    }

    /// Draws a hyperedge cardinality. Pairwise graphs always yield 2.
    pub fn sample_cardinality(&self, rng: &mut RngHandle) -> usize {
        match &self.cardinality {
            Some(index) => self.spec.cardinality.sizes[index.sample(rng)],
            None => 2,
        }
    }

    /// Number of communities (zero outside the community process).
    pub fn community_count(&self) -> usize {
        self.community.as_ref().map_or(0, |c| c.count)
    }

    /// Exploration constant γ (zero outside the community process).
    pub fn exploration(&self) -> f64 {
        self.community.as_ref().map_or(0.0, |c| c.exploration)
    }

    /// Probability of the joint insert-node-and-edge transition.
    pub fn joint_insert_probability(&self) -> f64 {
        self.community
            .as_ref()
            .map_or(0.0, |c| c.joint_insert_probability)
    }

    /// Draws the community of a newly inserted node.
    pub fn sample_community(&self, rng: &mut RngHandle) -> Option<usize> {
        self.community.as_ref().map(|c| c.membership.sample(rng))
    }

    /// Draws the ordered community pair spanned by a new hyperedge.
    pub fn sample_community_pair(&self, rng: &mut RngHandle) -> Option<(usize, usize)> {
        self.community.as_ref().map(|c| {
            let flat = c.pairs.sample(rng);
            (flat / c.count, flat % c.count)
        })
    }
}

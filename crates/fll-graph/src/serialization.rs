use std::io::{BufRead, Write};

use fll_core::provenance::SchemaVersion;
use fll_core::{FllError, NodeId};
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::hypergraph::Hypergraph;

/// Schema version written into JSON and binary payloads.
pub const GRAPH_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Largest node count a payload may declare or imply through its identifiers.
pub const MAX_NODES: usize = 1 << 28;

const NODES_HEADER: &str = "# nodes";

/// Writes a weighted edge list: a `# nodes N` header, then `a b weight` per
/// line in ascending pair order.
pub fn write_edge_list<W: Write>(graph: &Graph, mut out: W) -> Result<(), FllError> {
    writeln!(out, "{NODES_HEADER} {}", graph.node_count()).map_err(write_error)?;
    for (a, b, weight) in graph.weighted_edges() {
        writeln!(out, "{a} {b} {weight}").map_err(write_error)?;
    }
    out.flush().map_err(write_error)
}

/// Reads a weighted edge list written by [`write_edge_list`].
///
/// The weight column is optional (defaults to 1) and repeated pairs are
/// merged. Without a `# nodes` header the node count is one past the largest
/// identifier seen.
pub fn read_edge_list<R: BufRead>(input: R) -> Result<Graph, FllError> {
    let mut declared: Option<usize> = None;
    let mut rows: Vec<(u64, u64, u64)> = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.map_err(read_error)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix(NODES_HEADER) {
            let count: u64 = parse_field(rest.trim(), line_no)?;
            let count = check_node_count(count)
                .map_err(|err| err.with_context("line", line_no + 1))?;
            declared = Some(count);
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let (a, b, weight) = match fields.as_slice() {
            [a, b] => (parse_node(a, line_no)?, parse_node(b, line_no)?, 1),
            [a, b, w] => (
                parse_node(a, line_no)?,
                parse_node(b, line_no)?,
                parse_field(w, line_no)?,
            ),
            _ => {
                return Err(FllError::serde("edge-list-row", "expected `a b [weight]`")
                    .with_context("line", line_no + 1))
            }
        };
        rows.push((a, b, weight));
    }
    let seen = rows
        .iter()
        .map(|(a, b, _)| *a.max(b) as usize + 1)
        .max()
        .unwrap_or(0);
    let mut graph = Graph::with_nodes(declared.unwrap_or(seen).max(seen));
    for (a, b, weight) in rows {
        graph.add_weighted_edge(NodeId::from_raw(a), NodeId::from_raw(b), weight)?;
    }
    Ok(graph)
}

/// Writes a hyperedge list: a `# nodes N` header, then the members of one
/// hyperedge per line, space separated, in creation order.
pub fn write_hyperedge_list<W: Write>(hypergraph: &Hypergraph, mut out: W) -> Result<(), FllError> {
    writeln!(out, "{NODES_HEADER} {}", hypergraph.node_count()).map_err(write_error)?;
    for members in hypergraph.hyperedges() {
        let line: Vec<String> = members.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", line.join(" ")).map_err(write_error)?;
    }
    out.flush().map_err(write_error)
}

/// Reads a hyperedge list written by [`write_hyperedge_list`]. Community
/// assignments are not part of this format; see [`hypergraph_to_json`].
pub fn read_hyperedge_list<R: BufRead>(input: R) -> Result<Hypergraph, FllError> {
    let mut declared: Option<usize> = None;
    let mut rows: Vec<Vec<NodeId>> = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.map_err(read_error)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix(NODES_HEADER) {
            let count: u64 = parse_field(rest.trim(), line_no)?;
            let count = check_node_count(count)
                .map_err(|err| err.with_context("line", line_no + 1))?;
            declared = Some(count);
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        let members = trimmed
            .split_whitespace()
            .map(|field| parse_node(field, line_no).map(NodeId::from_raw))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(members);
    }
    let seen = rows
        .iter()
        .flatten()
        .map(|node| node.index() + 1)
        .max()
        .unwrap_or(0);
    let mut hypergraph = Hypergraph::new();
    for _ in 0..declared.unwrap_or(seen).max(seen) {
        hypergraph.add_node()?;
    }
    for members in rows {
        hypergraph.add_hyperedge(members)?;
    }
    Ok(hypergraph)
}

/// Serializes a graph to pretty JSON.
pub fn graph_to_json(graph: &Graph) -> Result<String, FllError> {
    serde_json::to_string_pretty(&SerializableGraph::from_graph(graph))
        .map_err(|err| FllError::serde("serialize-json", err.to_string()))
}

/// Restores a graph from JSON.
pub fn graph_from_json(json: &str) -> Result<Graph, FllError> {
    let payload: SerializableGraph = serde_json::from_str(json)
        .map_err(|err| FllError::serde("deserialize-json", err.to_string()))?;
    payload.into_graph()
}

/// Serializes a graph with `bincode`.
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, FllError> {
    bincode::serialize(&SerializableGraph::from_graph(graph))
        .map_err(|err| FllError::serde("serialize-bytes", err.to_string()))
}

/// Restores a graph from its binary representation.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, FllError> {
    let payload: SerializableGraph = bincode::deserialize(bytes)
        .map_err(|err| FllError::serde("deserialize-bytes", err.to_string()))?;
    payload.into_graph()
}

/// Serializes a hypergraph, including its community partition, to pretty JSON.
pub fn hypergraph_to_json(hypergraph: &Hypergraph) -> Result<String, FllError> {
    serde_json::to_string_pretty(&SerializableHypergraph::from_hypergraph(hypergraph))
        .map_err(|err| FllError::serde("serialize-json", err.to_string()))
}

/// Restores a hypergraph from JSON.
pub fn hypergraph_from_json(json: &str) -> Result<Hypergraph, FllError> {
    let payload: SerializableHypergraph = serde_json::from_str(json)
        .map_err(|err| FllError::serde("deserialize-json", err.to_string()))?;
    payload.into_hypergraph()
}

/// Serializes a hypergraph with `bincode`.
pub fn hypergraph_to_bytes(hypergraph: &Hypergraph) -> Result<Vec<u8>, FllError> {
    bincode::serialize(&SerializableHypergraph::from_hypergraph(hypergraph))
        .map_err(|err| FllError::serde("serialize-bytes", err.to_string()))
}

/// Restores a hypergraph from its binary representation.
pub fn hypergraph_from_bytes(bytes: &[u8]) -> Result<Hypergraph, FllError> {
    let payload: SerializableHypergraph = bincode::deserialize(bytes)
        .map_err(|err| FllError::serde("deserialize-bytes", err.to_string()))?;
    payload.into_hypergraph()
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableGraph {
    schema_version: SchemaVersion,
    nodes: usize,
    edges: Vec<(u64, u64, u64)>,
}

impl SerializableGraph {
    fn from_graph(graph: &Graph) -> Self {
        Self {
            schema_version: GRAPH_SCHEMA,
            nodes: graph.node_count(),
            edges: graph
                .weighted_edges()
                .map(|(a, b, weight)| (a.as_raw(), b.as_raw(), weight))
                .collect(),
        }
    }

    fn into_graph(self) -> Result<Graph, FllError> {
        check_schema(self.schema_version)?;
        let mut graph = Graph::with_nodes(check_node_count(self.nodes as u64)?);
        for (a, b, weight) in self.edges {
            graph.add_weighted_edge(NodeId::from_raw(a), NodeId::from_raw(b), weight)?;
        }
        Ok(graph)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableCommunities {
    count: usize,
    assignments: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableHypergraph {
    schema_version: SchemaVersion,
    nodes: usize,
    hyperedges: Vec<Vec<u64>>,
    #[serde(default)]
    communities: Option<SerializableCommunities>,
}

impl SerializableHypergraph {
    fn from_hypergraph(hypergraph: &Hypergraph) -> Self {
        Self {
            schema_version: GRAPH_SCHEMA,
            nodes: hypergraph.node_count(),
            hyperedges: hypergraph
                .hyperedges()
                .iter()
                .map(|members| members.iter().map(NodeId::as_raw).collect())
                .collect(),
            communities: hypergraph
                .communities()
                .map(|partition| SerializableCommunities {
                    count: partition.count(),
                    assignments: partition.assignments().to_vec(),
                }),
        }
    }

    fn into_hypergraph(self) -> Result<Hypergraph, FllError> {
        check_schema(self.schema_version)?;
        check_node_count(self.nodes as u64)?;
        let mut hypergraph = match &self.communities {
            Some(communities) => {
                if communities.assignments.len() != self.nodes {
                    return Err(FllError::serde(
                        "community-assignments",
                        "one community assignment per node is required",
                    )
                    .with_context("assignments", communities.assignments.len())
                    .with_context("nodes", self.nodes));
                }
                let mut hypergraph = Hypergraph::with_communities(communities.count);
                for &community in &communities.assignments {
                    hypergraph.add_node_in(community)?;
                }
                hypergraph
            }
            None => {
                let mut hypergraph = Hypergraph::new();
                for _ in 0..self.nodes {
                    hypergraph.add_node()?;
                }
                hypergraph
            }
        };
        for members in self.hyperedges {
            hypergraph.add_hyperedge(members.into_iter().map(NodeId::from_raw).collect())?;
        }
        Ok(hypergraph)
    }
}

fn check_schema(version: SchemaVersion) -> Result<(), FllError> {
    if version.major != GRAPH_SCHEMA.major {
        return Err(FllError::serde("schema-version", "unsupported payload schema")
            .with_context("major", version.major)
            .with_context("expected", GRAPH_SCHEMA.major));
    }
    Ok(())
}

fn check_node_count(count: u64) -> Result<usize, FllError> {
    usize::try_from(count)
        .ok()
        .filter(|count| *count <= MAX_NODES)
        .ok_or_else(|| {
            FllError::serde("node-limit", "node count exceeds the supported maximum")
                .with_context("nodes", count)
                .with_context("limit", MAX_NODES)
        })
}

/// Parses a node identifier, rejecting ids that would imply more than
/// [`MAX_NODES`] nodes.
fn parse_node(field: &str, line_no: usize) -> Result<u64, FllError> {
    let raw: u64 = parse_field(field, line_no)?;
    if raw >= MAX_NODES as u64 {
        return Err(FllError::serde("node-limit", "node identifier exceeds the supported maximum")
            .with_context("node", raw)
            .with_context("limit", MAX_NODES)
            .with_context("line", line_no + 1));
    }
    Ok(raw)
}

fn parse_field<T: std::str::FromStr>(field: &str, line_no: usize) -> Result<T, FllError> {
    field.parse().map_err(|_| {
        FllError::serde("parse-field", "field is not a non-negative integer")
            .with_context("field", field)
            .with_context("line", line_no + 1)
    })
}

fn write_error(err: std::io::Error) -> FllError {
    FllError::serde("write", err.to_string())
}

fn read_error(err: std::io::Error) -> FllError {
    FllError::serde("read", err.to_string())
}

use thiserror::Error;

use crate::ids::MappedId;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Faults raised by a graph view or by the engine while consuming one.
///
/// Id-map lookup misses are not errors; they surface as `None`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("relationship {node} -> {target} points outside the graph ({node_count} nodes)")]
    TargetOutOfRange {
        node: MappedId,
        target: MappedId,
        node_count: usize,
    },
    #[error("node {node} is outside the graph ({node_count} nodes)")]
    NodeOutOfRange { node: MappedId, node_count: usize },
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Raised by external `TraversalGraph` implementations (inconsistent
    /// backing data, closed snapshot, ...).
    #[error("graph view failure: {0}")]
    Capability(String),
}

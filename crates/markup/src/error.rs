//! Error types for tree operations
//!
//! Simple, flat error hierarchy. Usage errors (wrong accessor for a node's
//! kind, stale handles, inserting a node under itself) fail immediately;
//! cache-version skew is deliberately *not* here: the codec reports it as
//! `None`, because a stale cache entry is an expected condition.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarkupError>;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Wrong node kind: expected {expected} node, got {actual} node")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Node {0} cannot be moved into its own subtree")]
    CycleDetected(NodeId),

    #[error("Malformed backend node: {0}")]
    MalformedBackend(String),

    #[error("Interchange parse error: {0}")]
    Json(#[from] serde_json::Error),
}

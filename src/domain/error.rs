//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::mind_map::NodeId;

/// Domain errors represent violations of the mind-map and layout contracts.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid layout spacing: {name} must be positive, got {value}")]
    InvalidSpacing { name: &'static str, value: f64 },

    #[error("mind map has no root node")]
    MissingRoot,

    #[error("malformed tree: cycle detected at node {0}")]
    CycleDetected(NodeId),

    #[error("malformed tree: duplicate node id {0}")]
    DuplicateId(NodeId),

    #[error("malformed tree: node {parent} references unknown child {child}")]
    UnknownNode { parent: NodeId, child: NodeId },

    #[error("malformed tree: multiple roots found: {0:?}")]
    MultipleRoots(Vec<NodeId>),

    #[error("question not found: {0}")]
    QuestionNotFound(u32),
}

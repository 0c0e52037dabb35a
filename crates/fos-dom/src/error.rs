//! DOM operation errors

use crate::SelectorError;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node not found")]
    NotFound,

    #[error("hierarchy request error")]
    HierarchyRequest,

    #[error("invalid node type for this operation")]
    InvalidNodeType,

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("invalid selector: {0}")]
    Syntax(#[from] SelectorError),
}

//! DOM Node Operations
//!
//! Error type shared by tree mutation: appendChild, insertAfter, detach,
//! attribute writes.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("hierarchy request error")]
    HierarchyRequest,
    /// Invalid node type (e.g., attributes on a text node)
    #[error("invalid node type for {0}")]
    InvalidNodeType(NodeId),
    /// Reference node has no parent
    #[error("node {0} is detached")]
    Detached(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(DomError::NotFound(NodeId(7)).to_string(), "node #7 not found");
        assert_eq!(DomError::Detached(NodeId(2)).to_string(), "node #2 is detached");
    }
}

//! j508 DOM - Document Object Model
//!
//! Arena-allocated DOM tree with the query, mutation and event-binding
//! capabilities the compliance fixer drives.

mod interner;
mod node;
mod tree;
mod document;
mod operations;
mod selector;
mod style;
pub mod events;
pub mod geometry;

pub use interner::{StringInterner, InternedString};
pub use node::{Node, NodeData, ElementData, TextData, Attribute, QualName};
pub use tree::{DomTree, Children, Descendants};
pub use document::Document;
pub use operations::{DomError, DomResult};
pub use selector::{
    ElementQuery, SelectorList, ComplexSelector, CompoundSelector, SimpleSelector,
    AttrSelector, AttrOp, SelectorError,
};
pub use style::InlineStyle;
pub use events::{Event, EventType, EventTarget, EventRegistry, Key};
pub use geometry::DOMRect;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check this is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Build an ID from a raw arena index.
    ///
    /// The ID is not checked against any tree; lookups with an unknown
    /// index simply fail. Indices past `u32` map to `NONE`.
    pub fn from_index(index: usize) -> Self {
        u32::try_from(index).map_or(Self::NONE, Self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index() {
        assert_eq!(NodeId::from_index(0), NodeId::ROOT);
        assert_eq!(NodeId::from_index(7).index(), 7);
        assert_eq!(NodeId::from_index(u32::MAX as usize + 1), NodeId::NONE);
        assert!(!NodeId::from_index(usize::MAX).is_valid());
    }
}

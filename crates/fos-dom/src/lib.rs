//! fOS DOM - Document Object Model
//!
//! Arena DOM used by the accessibility overlay: ordered attributes, class
//! lists, selector queries, geometry, mutation observation and listener
//! registration.

mod document;
mod error;
pub mod events;
pub mod geometry;
mod node;
pub mod observer;
mod selector;
mod tree;

pub use document::Document;
pub use error::{DomError, DomResult};
pub use events::{DomEvent, EventType};
pub use geometry::{DOMRect, Viewport};
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use observer::{MutationObserverInit, MutationRecord, MutationType};
pub use selector::{SelectorError, SelectorList};
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this refers to a node at all
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena slot
    #[inline]
    pub(crate) fn index(self) -> Option<usize> {
        self.is_valid().then_some(self.0 as usize)
    }

    /// Raw arena slot, for hosts that keep side tables
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

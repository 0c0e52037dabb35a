//! Host document capability
//!
//! Everything the overlay engine needs from a live document, behind one
//! trait. `fos_dom::Document` implements it in-process; a browser binding
//! would implement it over real DOM handles.

use std::fmt::Debug;

use fos_dom::{DOMRect, EventType, MutationObserverInit, Viewport};

/// Failures reported by a host document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("node is detached or unknown")]
    NodeNotFound,

    #[error("operation not valid for this node type")]
    InvalidNodeType,

    #[error("tree operation rejected: {0}")]
    Rejected(String),
}

/// One observed DOM change, reduced to what the reconciler inspects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A node was added or removed somewhere in the observed subtree
    ChildList,
    /// An attribute changed; lowercase attribute name
    Attribute(String),
    /// Text node data changed
    CharacterData,
}

/// Input types the HTML `type` IDL attribute reflects; anything else is "text"
const INPUT_TYPES: &[&str] = &[
    "hidden", "text", "search", "tel", "url", "email", "password", "date",
    "month", "week", "time", "datetime-local", "number", "range", "color",
    "checkbox", "radio", "file", "submit", "image", "reset", "button",
];

/// Document operations used by the overlay engine
pub trait DomHost {
    /// Node handle
    type Node: Copy + Eq + Debug;

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Lowercase tag name; `None` for anything that is not an element
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// All attributes in declaration order
    fn attributes(&self, node: Self::Node) -> Vec<(&str, &str)>;

    /// `textContent`
    fn text_content(&self, node: Self::Node) -> String;

    /// First connected element with the given id
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// `document.querySelectorAll`
    fn query_selector_all(&self, selectors: &str) -> Result<Vec<Self::Node>, HostError>;

    /// `element.closest`, inclusive of the element itself
    fn closest(&self, node: Self::Node, selectors: &str) -> Result<Option<Self::Node>, HostError>;

    fn document_element(&self) -> Option<Self::Node>;

    fn body(&self) -> Option<Self::Node>;

    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// `classList.toggle(class, present)`; no-op when already in that state
    fn set_class(&mut self, node: Self::Node, class: &str, present: bool) -> Result<(), HostError>;

    /// New detached element
    fn create_element(&mut self, tag: &str) -> Self::Node;

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), HostError>;

    /// Append a new text node to `parent`
    fn append_text(&mut self, parent: Self::Node, text: &str) -> Result<(), HostError>;

    /// `node.remove()`
    fn remove_node(&mut self, node: Self::Node) -> Result<(), HostError>;

    /// Remove a node the engine created and will never touch again. Hosts
    /// that pool node storage reclaim the subtree here.
    fn discard_node(&mut self, node: Self::Node) -> Result<(), HostError> {
        self.remove_node(node)
    }

    /// Set one inline style property
    fn set_style(&mut self, node: Self::Node, property: &str, value: &str) -> Result<(), HostError>;

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// `getBoundingClientRect()`, viewport coordinates
    fn bounding_client_rect(&self, node: Self::Node) -> DOMRect;

    fn viewport(&self) -> Viewport;

    // ------------------------------------------------------------------
    // Events and observation
    // ------------------------------------------------------------------

    fn add_listener(&mut self, node: Self::Node, event_type: EventType);

    fn remove_listener(&mut self, node: Self::Node, event_type: EventType);

    fn has_listener(&self, node: Self::Node, event_type: EventType) -> bool;

    fn observe_mutations(&mut self, target: Self::Node, options: MutationObserverInit);

    /// Drain the queued mutation batch
    fn take_mutations(&mut self) -> Vec<Mutation>;

    // ------------------------------------------------------------------
    // Element state with attribute-based defaults. Hosts with live form
    // state override these.
    // ------------------------------------------------------------------

    fn has_attribute(&self, node: Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// The `type` IDL attribute of an input
    fn input_type(&self, node: Self::Node) -> String {
        let raw = self.attribute(node, "type").unwrap_or("").trim().to_ascii_lowercase();
        if INPUT_TYPES.contains(&raw.as_str()) {
            raw
        } else {
            "text".to_string()
        }
    }

    /// Checkedness of a checkbox/radio
    fn is_checked(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "checked")
    }

    /// Selectedness of an option
    fn is_selected(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "selected")
    }

    /// Open state of a details element
    fn is_open(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "open")
    }

    /// The `hidden` IDL attribute
    fn is_hidden(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "hidden")
    }
}

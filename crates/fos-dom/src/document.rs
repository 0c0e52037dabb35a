//! Document - High-level document API
//!
//! Wraps the arena tree with the pieces a page script sees: id and selector
//! queries, attribute/class mutation with observer records, inline styles,
//! geometry, and listener registration.

use std::collections::HashMap;

use crate::events::{DomEvent, EventType, ListenerRegistry};
use crate::geometry::{DOMRect, TextMetrics, Viewport};
use crate::observer::{MutationObserver, MutationObserverInit, MutationRecord};
use crate::{DomError, DomResult, DomTree, NodeData, NodeId, SelectorList};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    observer: MutationObserver,
    listeners: ListenerRegistry,
    /// Layout boxes supplied by whoever laid the page out
    rects: HashMap<NodeId, DOMRect>,
    viewport: Viewport,
    text_metrics: TextMetrics,
}

impl Document {
    /// Create a new document with html/head/body
    pub fn new(url: &str) -> Self {
        let mut document = Self::empty(url);
        let tree = &mut document.tree;
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        for (parent, child) in [(NodeId::ROOT, html), (html, head), (html, body)] {
            let linked = tree.append_child(parent, child);
            debug_assert!(linked.is_ok());
        }

        document.html_element = html;
        document.head_element = head;
        document.body_element = body;
        document
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            observer: MutationObserver::new(),
            listeners: ListenerRegistry::new(),
            rects: HashMap::new(),
            viewport: Viewport::default(),
            text_metrics: TextMetrics::default(),
        }
    }

    /// Locate html/head/body after the tree was built directly
    pub fn finalize(&mut self) {
        let find_child = |tree: &DomTree, parent: NodeId, tag: &str| {
            tree.children(parent)
                .find(|(_, node)| node.as_element().is_some_and(|e| e.name == tag))
                .map_or(NodeId::NONE, |(id, _)| id)
        };

        self.html_element = find_child(&self.tree, NodeId::ROOT, "html");
        if self.html_element.is_valid() {
            self.head_element = find_child(&self.tree, self.html_element, "head");
            self.body_element = find_child(&self.tree, self.html_element, "body");
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first <title> in <head>
    pub fn title(&self) -> String {
        let Some(head) = self.head() else {
            return String::new();
        };
        self.tree
            .children(head)
            .find(|(_, node)| node.as_element().is_some_and(|e| e.name == "title"))
            .map(|(id, _)| self.tree.text_content(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        self.html_element.is_valid().then_some(self.html_element)
    }

    /// Get <head> element
    pub fn head(&self) -> Option<NodeId> {
        self.head_element.is_valid().then_some(self.head_element)
    }

    /// Get <body> element
    pub fn body(&self) -> Option<NodeId> {
        self.body_element.is_valid().then_some(self.body_element)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably.
    ///
    /// Changes made here bypass mutation observers.
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First connected element with the given id, in tree order
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.tree
            .descendants(NodeId::ROOT)
            .find(|(_, node)| node.as_element().and_then(|e| e.id()) == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// All connected elements matching a selector list, in tree order
    pub fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<NodeId>> {
        let list = SelectorList::parse(selectors)?;
        Ok(self.select(&list))
    }

    /// All connected elements matching a parsed selector list
    pub fn select(&self, list: &SelectorList) -> Vec<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .filter(|(_, node)| node.as_element().is_some_and(|e| list.matches(e)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Nearest inclusive ancestor matching the selector list
    pub fn closest(&self, node: NodeId, selectors: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selectors)?;
        Ok(self.closest_parsed(node, &list))
    }

    /// `closest` with a parsed selector list
    pub fn closest_parsed(&self, node: NodeId, list: &SelectorList) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .find(|&id| self.tree.element(id).is_some_and(|e| list.matches(e)))
    }

    /// Concatenated descendant text
    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    // ------------------------------------------------------------------
    // Attributes and classes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.element(node)?.get_attr(name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    /// Set an attribute, queueing an attribute record
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let elem = self.tree.element_mut(node).ok_or(DomError::InvalidNodeType)?;
        let old = elem.set_attr(name, value);
        self.queue(MutationRecord::attribute(node, name, old));
        Ok(())
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<bool> {
        let elem = self.tree.element_mut(node).ok_or(DomError::InvalidNodeType)?;
        match elem.remove_attr(name) {
            Some(old) => {
                self.queue(MutationRecord::attribute(node, name, Some(old)));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree.element(node).is_some_and(|e| e.has_class(class))
    }

    /// `classList.toggle(class, force)`; the attribute is only rewritten
    /// (and a record queued) when membership changes
    pub fn toggle_class(&mut self, node: NodeId, class: &str, force: Option<bool>) -> DomResult<bool> {
        let elem = self.tree.element(node).ok_or(DomError::InvalidNodeType)?;
        let present = elem.has_class(class);
        let wanted = force.unwrap_or(!present);
        if wanted == present {
            return Ok(present);
        }

        let mut tokens: Vec<&str> = elem.classes().filter(|c| *c != class).collect();
        if wanted {
            tokens.push(class);
        }
        let value = tokens.join(" ");
        self.set_attribute(node, "class", &value)?;
        Ok(wanted)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        self.toggle_class(node, class, Some(true)).map(|_| ())
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        self.toggle_class(node, class, Some(false)).map(|_| ())
    }

    /// Set one inline style property, keeping the others
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> DomResult<()> {
        let current = self.get_attribute(node, "style").unwrap_or("");
        let mut declarations: Vec<(String, String)> = parse_style(current)
            .filter(|(name, _)| !name.eq_ignore_ascii_case(property))
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        declarations.push((property.to_string(), value.to_string()));

        let style = declarations
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(node, "style", &style)
    }

    /// Read one inline style property
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        parse_style(self.get_attribute(node, "style")?)
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    /// Append a child, queueing child-list records
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let old_parent = self.tree.parent(child);
        self.tree.append_child(parent, child)?;
        if let Some(old_parent) = old_parent {
            self.queue(MutationRecord::child_list(old_parent, vec![], vec![child]));
        }
        self.queue(MutationRecord::child_list(parent, vec![child], vec![]));
        Ok(())
    }

    /// Remove a child, queueing a child-list record
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.remove_child(parent, child)?;
        self.queue(MutationRecord::child_list(parent, vec![], vec![child]));
        Ok(())
    }

    /// `node.remove()`: detach from whatever parent it has
    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        match self.tree.parent(node) {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(()),
        }
    }

    /// Remove `node` and return its subtree's slots to the arena.
    ///
    /// Layout boxes and listeners on the subtree are dropped with it. The
    /// subtree must not hold the cached html/head/body elements.
    pub fn discard(&mut self, node: NodeId) -> DomResult<()> {
        let cached = [self.html_element, self.head_element, self.body_element];
        if cached
            .iter()
            .any(|&element| element.is_valid() && self.tree.is_inclusive_ancestor(node, element))
        {
            return Err(DomError::HierarchyRequest);
        }
        self.remove(node)?;
        for id in self.tree.release(node)? {
            self.rects.remove(&id);
            self.listeners.forget(id);
        }
        Ok(())
    }

    /// Replace a text node's data
    pub fn set_text(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        let target = self.tree.get_mut(node).ok_or(DomError::NotFound)?;
        let NodeData::Text(data) = &mut target.data else {
            return Err(DomError::InvalidNodeType);
        };
        let old = std::mem::replace(&mut data.content, text.to_string());
        self.queue(MutationRecord::character_data(node, old));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Record the layout box of a node
    pub fn set_rect(&mut self, node: NodeId, rect: DOMRect) {
        self.rects.insert(node, rect);
    }

    /// `getBoundingClientRect()`.
    ///
    /// Nodes without a recorded box get a text-metrics estimate placed at
    /// the viewport origin; detached nodes measure as empty.
    pub fn bounding_client_rect(&self, node: NodeId) -> DOMRect {
        if let Some(rect) = self.rects.get(&node) {
            return *rect;
        }
        if !self.tree.is_connected(node) {
            return DOMRect::default();
        }
        let text = self.tree.text_content(node);
        if text.is_empty() {
            return DOMRect::default();
        }
        let (width, height) = self.text_metrics.measure(&text);
        DOMRect::from_xywh(0.0, 0.0, width, height)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.viewport.scroll_to(x, y);
    }

    // ------------------------------------------------------------------
    // Observers and listeners
    // ------------------------------------------------------------------

    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        self.observer.observe(target, options);
    }

    pub fn disconnect_observer(&mut self) {
        self.observer.disconnect();
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.observer.take_records()
    }

    pub fn has_pending_records(&self) -> bool {
        self.observer.has_pending()
    }

    fn queue(&mut self, record: MutationRecord) {
        let tree = &self.tree;
        self.observer
            .record(record, |ancestor, node| tree.is_inclusive_ancestor(ancestor, node));
    }

    pub fn add_event_listener(&mut self, node: NodeId, event_type: EventType) -> bool {
        self.listeners.add(node, event_type)
    }

    pub fn remove_event_listener(&mut self, node: NodeId, event_type: EventType) -> bool {
        self.listeners.remove(node, event_type)
    }

    pub fn has_event_listener(&self, node: NodeId, event_type: EventType) -> bool {
        self.listeners.contains(node, event_type)
    }

    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.count(event_type)
    }

    /// Fire an event at `target` and return the listener deliveries
    pub fn dispatch(&self, event_type: EventType, target: NodeId) -> Vec<DomEvent> {
        let path = std::iter::once(target).chain(self.tree.ancestors(target));
        let deliveries = self.listeners.resolve(event_type, target, path);
        tracing::trace!(
            "{} on {:?}: {} listener(s)",
            event_type.as_str(),
            target,
            deliveries.len()
        );
        deliveries
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

fn parse_style(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let name = name.trim();
        (!name.is_empty()).then(|| (name, value.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::MutationType;

    #[test]
    fn test_new_document_structure() {
        let doc = Document::default();
        assert!(doc.document_element().is_some());
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.url(), "about:blank");
    }

    #[test]
    fn test_toggle_class_only_records_changes() {
        let mut doc = Document::default();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.observe(
            body,
            MutationObserverInit {
                attributes: true,
                subtree: true,
                ..Default::default()
            },
        );

        assert!(doc.toggle_class(div, "mark", Some(true)).unwrap());
        assert!(doc.toggle_class(div, "mark", Some(true)).unwrap());
        assert!(!doc.toggle_class(div, "mark", None).unwrap());

        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.mutation_type == MutationType::Attributes));
        assert_eq!(doc.get_attribute(div, "class"), Some(""));
    }

    #[test]
    fn test_style_properties() {
        let mut doc = Document::default();
        let body = doc.body().unwrap();
        doc.set_style(body, "top", "10px").unwrap();
        doc.set_style(body, "left", "4px").unwrap();
        doc.set_style(body, "top", "12px").unwrap();

        assert_eq!(doc.style(body, "top"), Some("12px"));
        assert_eq!(doc.style(body, "left"), Some("4px"));
        assert_eq!(doc.get_attribute(body, "style"), Some("left: 4px; top: 12px;"));
    }

    #[test]
    fn test_closest_is_inclusive() {
        let mut doc = Document::default();
        let body = doc.body().unwrap();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(body, outer).unwrap();
        doc.append_child(outer, inner).unwrap();
        doc.set_attribute(outer, "aria-hidden", "true").unwrap();

        let sel = r#"[aria-hidden="true"]"#;
        assert_eq!(doc.closest(inner, sel).unwrap(), Some(outer));
        assert_eq!(doc.closest(outer, sel).unwrap(), Some(outer));
        assert_eq!(doc.closest(body, sel).unwrap(), None);
        assert!(doc.closest(body, "div >").is_err());
    }

    #[test]
    fn test_detached_nodes_leave_queries() {
        let mut doc = Document::default();
        let body = doc.body().unwrap();
        let button = doc.create_element("button");
        doc.append_child(body, button).unwrap();
        doc.set_attribute(button, "id", "go").unwrap();

        assert_eq!(doc.get_element_by_id("go"), Some(button));
        doc.remove(button).unwrap();
        assert_eq!(doc.get_element_by_id("go"), None);
        assert!(doc.query_selector_all("button").unwrap().is_empty());
    }
}

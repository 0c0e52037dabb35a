//! `DomHost` over the in-process arena document

use fos_dom::{
    DOMRect, Document, DomError, EventType, MutationObserverInit, MutationType, NodeId, Viewport,
};

use crate::host::{DomHost, HostError, Mutation};

impl From<DomError> for HostError {
    fn from(err: DomError) -> Self {
        match err {
            DomError::NotFound => HostError::NodeNotFound,
            DomError::InvalidNodeType => HostError::InvalidNodeType,
            DomError::Syntax(err) => HostError::InvalidSelector {
                selector: String::new(),
                reason: err.to_string(),
            },
            other => HostError::Rejected(other.to_string()),
        }
    }
}

fn selector_error(selectors: &str, err: DomError) -> HostError {
    match err {
        DomError::Syntax(reason) => HostError::InvalidSelector {
            selector: selectors.to_string(),
            reason: reason.to_string(),
        },
        other => other.into(),
    }
}

impl DomHost for Document {
    type Node = NodeId;

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tree().element(node).map(|e| e.name.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get_attribute(node, name)
    }

    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)> {
        self.tree()
            .element(node)
            .map(|e| {
                e.attrs
                    .iter()
                    .map(|a| (a.name.as_str(), a.value.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn text_content(&self, node: NodeId) -> String {
        Document::text_content(self, node)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }

    fn query_selector_all(&self, selectors: &str) -> Result<Vec<NodeId>, HostError> {
        Document::query_selector_all(self, selectors).map_err(|e| selector_error(selectors, e))
    }

    fn closest(&self, node: NodeId, selectors: &str) -> Result<Option<NodeId>, HostError> {
        Document::closest(self, node, selectors).map_err(|e| selector_error(selectors, e))
    }

    fn document_element(&self) -> Option<NodeId> {
        Document::document_element(self)
    }

    fn body(&self) -> Option<NodeId> {
        Document::body(self)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        Document::has_class(self, node, class)
    }

    fn set_class(&mut self, node: NodeId, class: &str, present: bool) -> Result<(), HostError> {
        self.toggle_class(node, class, Some(present))?;
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        Document::create_element(self, tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        Ok(Document::append_child(self, parent, child)?)
    }

    fn append_text(&mut self, parent: NodeId, text: &str) -> Result<(), HostError> {
        let node = self.create_text(text);
        Ok(Document::append_child(self, parent, node)?)
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), HostError> {
        Ok(self.remove(node)?)
    }

    fn discard_node(&mut self, node: NodeId) -> Result<(), HostError> {
        Ok(self.discard(node)?)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), HostError> {
        Ok(Document::set_style(self, node, property, value)?)
    }

    fn bounding_client_rect(&self, node: NodeId) -> DOMRect {
        Document::bounding_client_rect(self, node)
    }

    fn viewport(&self) -> Viewport {
        Document::viewport(self)
    }

    fn add_listener(&mut self, node: NodeId, event_type: EventType) {
        self.add_event_listener(node, event_type);
    }

    fn remove_listener(&mut self, node: NodeId, event_type: EventType) {
        self.remove_event_listener(node, event_type);
    }

    fn has_listener(&self, node: NodeId, event_type: EventType) -> bool {
        self.has_event_listener(node, event_type)
    }

    fn observe_mutations(&mut self, target: NodeId, options: MutationObserverInit) {
        self.observe(target, options);
    }

    fn take_mutations(&mut self) -> Vec<Mutation> {
        self.take_records()
            .into_iter()
            .map(|record| match record.mutation_type {
                MutationType::ChildList => Mutation::ChildList,
                MutationType::CharacterData => Mutation::CharacterData,
                MutationType::Attributes => {
                    Mutation::Attribute(record.attribute_name.unwrap_or_default())
                }
            })
            .collect()
    }
}

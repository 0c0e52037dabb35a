//! Mutation Observer
//!
//! Records child-list, attribute and character-data mutations for the
//! observed subtrees. The document feeds every mutation through
//! [`MutationObserver::record`]; the host drains batches with
//! [`MutationObserver::take_records`].

use crate::NodeId;

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    /// Attribute change on `target`
    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_ascii_lowercase()),
            old_value,
        }
    }

    /// Child list change on `target`
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }

    /// Text change on `target`
    pub fn character_data(target: NodeId, old_value: String) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
            old_value: Some(old_value),
        }
    }
}

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    fn wants(&self, record: &MutationRecord) -> bool {
        match record.mutation_type {
            MutationType::ChildList => self.child_list,
            MutationType::CharacterData => self.character_data,
            MutationType::Attributes => {
                self.attributes
                    && match (&self.attribute_filter, &record.attribute_name) {
                        (Some(filter), Some(name)) => filter.iter().any(|f| f.eq_ignore_ascii_case(name)),
                        _ => true,
                    }
            }
        }
    }
}

/// Mutation observer
#[derive(Debug, Default)]
pub struct MutationObserver {
    observations: Vec<(NodeId, MutationObserverInit)>,
    pending_records: Vec<MutationRecord>,
}

impl MutationObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a target, replacing options if it is already observed
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        match self.observations.iter_mut().find(|(t, _)| *t == target) {
            Some((_, existing)) => *existing = options,
            None => self.observations.push((target, options)),
        }
    }

    /// Stop observing everything and drop queued records
    pub fn disconnect(&mut self) {
        self.observations.clear();
        self.pending_records.clear();
    }

    /// Check if observing node
    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observations.iter().any(|(t, _)| *t == node)
    }

    /// Queue a mutation if any observation covers it.
    ///
    /// `contains(ancestor, node)` answers inclusive-ancestry so subtree
    /// observations see mutations below their target.
    pub fn record(&mut self, mut mutation: MutationRecord, contains: impl Fn(NodeId, NodeId) -> bool) {
        let matching = self.observations.iter().find(|(target, options)| {
            let in_scope = if options.subtree {
                contains(*target, mutation.target)
            } else {
                *target == mutation.target
            };
            in_scope && options.wants(&mutation)
        });

        if let Some((_, options)) = matching {
            if mutation.mutation_type == MutationType::Attributes && !options.attribute_old_value {
                mutation.old_value = None;
            }
            self.pending_records.push(mutation);
        }
    }

    /// Take pending records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending_records)
    }

    /// Has pending records
    pub fn has_pending(&self) -> bool {
        !self.pending_records.is_empty()
    }
}

//! DOM Events
//!
//! Listener registration and propagation-path resolution. Listeners are
//! plain `(node, event type)` registrations; whoever drives the event loop
//! receives the resolved deliveries and runs its own handlers.

use std::collections::HashSet;

use crate::NodeId;

/// DOM event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PointerEnter,
    PointerLeave,
    Click,
}

impl EventType {
    /// Whether the event propagates to ancestors
    pub fn bubbles(self) -> bool {
        matches!(self, Self::Click)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerEnter => "pointerenter",
            Self::PointerLeave => "pointerleave",
            Self::Click => "click",
        }
    }
}

/// DOM event delivered to one listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: NodeId,
}

/// Registered listeners
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashSet<(NodeId, EventType)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register; returns false if already registered
    pub fn add(&mut self, node: NodeId, event_type: EventType) -> bool {
        self.listeners.insert((node, event_type))
    }

    /// Unregister; returns false if nothing was registered
    pub fn remove(&mut self, node: NodeId, event_type: EventType) -> bool {
        self.listeners.remove(&(node, event_type))
    }

    /// Drop every registration on `node`
    pub fn forget(&mut self, node: NodeId) {
        self.listeners.retain(|(registered, _)| *registered != node);
    }

    pub fn contains(&self, node: NodeId, event_type: EventType) -> bool {
        self.listeners.contains(&(node, event_type))
    }

    /// Number of registrations for an event type
    pub fn count(&self, event_type: EventType) -> usize {
        self.listeners.iter().filter(|(_, t)| *t == event_type).count()
    }

    /// Deliveries for an event fired at `target`, innermost first.
    ///
    /// `path` is the target followed by its ancestors.
    pub fn resolve(
        &self,
        event_type: EventType,
        target: NodeId,
        path: impl IntoIterator<Item = NodeId>,
    ) -> Vec<DomEvent> {
        let mut deliveries = Vec::new();
        for node in path {
            if self.contains(node, event_type) {
                deliveries.push(DomEvent {
                    event_type,
                    target,
                    current_target: node,
                });
            }
            if !event_type.bubbles() {
                break;
            }
        }
        deliveries
    }
}

//! Inspector session
//!
//! Owns the document, the flags and the engine state, and routes host
//! events into the engine. Nothing here ever returns an engine failure to
//! the page: failures are logged and the session carries on.

use std::time::Instant;

use fos_a11y::{
    A11yError, DomHost, Feature, FeatureFlags, HoverInspector, MutationReconciler,
    apply_features, dismiss_markers,
};
use fos_dom::{Document, EventType, NodeId};

use crate::config::InspectorConfig;
use crate::settings::{SettingsError, SettingsStore, load_flags};

/// A document with the overlay running on it
pub struct Inspector<S: SettingsStore> {
    document: Document,
    store: S,
    flags: FeatureFlags,
    hover: HoverInspector<NodeId>,
    reconciler: MutationReconciler,
}

impl<S: SettingsStore> Inspector<S> {
    /// Initial load: read flags, start observing, apply every feature
    pub fn load(mut document: Document, store: S, config: InspectorConfig) -> Self {
        document.set_viewport(config.viewport);
        document.add_event_listener(NodeId::ROOT, EventType::Click);

        let reconciler = MutationReconciler::with_delay(config.debounce_delay);
        if let Err(err) = reconciler.observe(&mut document) {
            tracing::warn!("mutation observation unavailable: {err}");
        }

        let flags = load_flags(&store);
        tracing::info!(
            "loaded {} with {} feature(s) enabled",
            document.url(),
            flags.iter().filter(|(_, on)| *on).count()
        );

        let mut inspector = Self {
            document,
            store,
            flags,
            hover: HoverInspector::new(),
            reconciler,
        };
        inspector.apply_all();
        inspector
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for page-side changes; feed the resulting records
    /// through `handle_mutations`
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    pub fn hover(&self) -> &HoverInspector<NodeId> {
        &self.hover
    }

    pub fn reconciler(&self) -> &MutationReconciler {
        &self.reconciler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checkbox change: update the flag, persist it, re-apply everything.
    /// A failed write still leaves the flag applied for this session.
    pub fn set_feature(&mut self, feature: Feature, enabled: bool) -> Result<(), SettingsError> {
        self.flags.set(feature, enabled);
        let persisted = self.store.set_bool(feature.key(), enabled);
        self.apply_all();
        persisted
    }

    /// Full feature pass, errors logged
    pub fn apply_all(&mut self) {
        if let Err(err) = apply_features(&mut self.document, &mut self.hover, &self.flags) {
            tracing::error!("error applying features: {err}");
        }
    }

    /// Fire a pointer or click event at `target` and run the handlers
    /// listening along its path. Returns the number of handlers run.
    pub fn handle_event(&mut self, event_type: EventType, target: NodeId) -> usize {
        let deliveries = self.document.dispatch(event_type, target);
        for event in &deliveries {
            match event.event_type {
                EventType::PointerEnter => {
                    self.hover
                        .on_pointer_enter(&mut self.document, &self.flags, event.current_target);
                }
                EventType::PointerLeave => self.hover.on_pointer_leave(&mut self.document),
                EventType::Click => self.on_click(event.target),
            }
        }
        deliveries.len()
    }

    fn on_click(&mut self, target: NodeId) {
        match dismiss_markers(&mut self.document, &mut self.hover, target) {
            Ok(true) => tracing::debug!("dismissed markers on {target:?}"),
            Ok(false) => {}
            Err(err) => tracing::error!("failed to dismiss markers: {err}"),
        }
    }

    /// Drain the observer queue into the reconciler. Returns whether a
    /// pass was (re)scheduled.
    pub fn handle_mutations(&mut self, now: Instant) -> bool {
        let batch = self.document.take_mutations();
        !batch.is_empty() && self.reconciler.on_mutations(&batch, now)
    }

    /// Timer tick: run the pending pass if it is due
    pub fn tick(&mut self, now: Instant) -> bool {
        self.reconciler
            .run_due(now, &mut self.document, &mut self.hover, &self.flags)
    }

    /// Show the tooltip for the element with `id`, as a hover would
    pub fn hover_element(&mut self, id: &str) -> Result<NodeId, A11yError> {
        let element = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| A11yError::NotAnElement(format!("#{id}")))?;
        self.handle_event(EventType::PointerEnter, element);
        Ok(element)
    }
}

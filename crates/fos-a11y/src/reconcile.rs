//! Mutation Reconciler
//!
//! Watches the body subtree and re-runs the full feature pass once the
//! page has been quiet for the debounce delay. Only one pass is ever
//! pending; every qualifying batch pushes its deadline back.

use std::time::{Duration, Instant};

use fos_dom::MutationObserverInit;

use crate::features::FeatureFlags;
use crate::host::{DomHost, Mutation};
use crate::hover::HoverInspector;
use crate::overlay::apply_features;
use crate::{A11yError, A11yResult};

/// Quiet period before a reconciliation pass
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(50);

/// Attributes whose changes can alter the overlay
pub const WATCHED_ATTRIBUTES: [&str; 22] = [
    "class",
    "id",
    "role",
    "tabindex",
    "alt",
    "aria-label",
    "aria-labelledby",
    "title",
    "value",
    "for",
    "hidden",
    "disabled",
    "checked",
    "selected",
    "open",
    "aria-expanded",
    "aria-pressed",
    "aria-current",
    "aria-selected",
    "aria-checked",
    "aria-invalid",
    "aria-disabled",
];

/// Observer options: child lists and watched attributes, whole subtree
pub fn observer_options() -> MutationObserverInit {
    MutationObserverInit {
        child_list: true,
        attributes: true,
        subtree: true,
        attribute_filter: Some(WATCHED_ATTRIBUTES.iter().map(|a| a.to_string()).collect()),
        ..Default::default()
    }
}

impl Mutation {
    /// Whether this change can affect any overlay marker
    pub fn is_relevant(&self) -> bool {
        match self {
            Mutation::ChildList => true,
            Mutation::Attribute(name) => WATCHED_ATTRIBUTES.contains(&name.as_str()),
            Mutation::CharacterData => false,
        }
    }
}

/// Single-slot debounce around `apply_features`
#[derive(Debug)]
pub struct MutationReconciler {
    delay: Duration,
    pending: Option<Instant>,
    passes: u64,
}

impl MutationReconciler {
    pub fn new() -> Self {
        Self::with_delay(DEBOUNCE_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            passes: 0,
        }
    }

    /// Start observing the body subtree
    pub fn observe<H: DomHost>(&self, host: &mut H) -> A11yResult<()> {
        let body = host.body().ok_or(A11yError::MissingBody)?;
        host.observe_mutations(body, observer_options());
        Ok(())
    }

    /// Feed one observer batch. Re-arms the timer if any record qualifies;
    /// returns whether it did.
    pub fn on_mutations(&mut self, batch: &[Mutation], now: Instant) -> bool {
        let relevant = batch.iter().any(Mutation::is_relevant);
        if relevant {
            self.schedule(now);
        }
        relevant
    }

    /// Replace any pending deadline with `now + delay`
    pub fn schedule(&mut self, now: Instant) {
        self.pending = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Clear the slot if its deadline has passed; true means a pass is due.
    /// The slot is empty before the pass runs, so the pass may schedule
    /// again.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Run the full feature pass if the deadline has passed. Errors are
    /// logged and swallowed. Returns whether a pass ran.
    pub fn run_due<H: DomHost>(
        &mut self,
        now: Instant,
        host: &mut H,
        hover: &mut HoverInspector<H::Node>,
        flags: &FeatureFlags,
    ) -> bool {
        if !self.take_due(now) {
            return false;
        }
        self.passes += 1;
        tracing::debug!("reconciliation pass {}", self.passes);
        if let Err(err) = apply_features(host, hover, flags) {
            tracing::error!("error applying features: {err}");
        }
        true
    }

    /// Number of passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl Default for MutationReconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance() {
        assert!(Mutation::ChildList.is_relevant());
        assert!(Mutation::Attribute("aria-pressed".into()).is_relevant());
        assert!(!Mutation::Attribute("style".into()).is_relevant());
        assert!(!Mutation::Attribute("aria-describedby".into()).is_relevant());
        assert!(!Mutation::CharacterData.is_relevant());
    }

    #[test]
    fn test_irrelevant_batch_does_not_arm() {
        let mut reconciler = MutationReconciler::new();
        let armed = reconciler.on_mutations(&[Mutation::Attribute("style".into())], Instant::now());
        assert!(!armed);
        assert!(!reconciler.is_pending());
    }

    #[test]
    fn test_rearm_pushes_deadline() {
        let mut reconciler = MutationReconciler::new();
        let start = Instant::now();
        reconciler.on_mutations(&[Mutation::ChildList], start);
        reconciler.on_mutations(&[Mutation::ChildList], start + Duration::from_millis(30));

        assert!(!reconciler.take_due(start + Duration::from_millis(60)));
        assert!(reconciler.take_due(start + Duration::from_millis(80)));
        assert!(!reconciler.is_pending());
        assert!(!reconciler.take_due(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_burst_runs_one_pass() {
        let mut d = fos_html::parse("<ul></ul>").unwrap();
        let mut reconciler = MutationReconciler::new();
        reconciler.observe(&mut d).unwrap();
        let mut hover = HoverInspector::new();
        let flags = FeatureFlags { focusable: true, ..Default::default() };

        let list = d.query_selector_all("ul").unwrap()[0];
        let start = Instant::now();
        for i in 0..100 {
            let item = d.create_element("button");
            d.append_child(list, item).unwrap();
            let batch = d.take_mutations();
            reconciler.on_mutations(&batch, start + Duration::from_millis(i / 4));
        }

        let mut now = start;
        while now < start + Duration::from_millis(500) {
            reconciler.run_due(now, &mut d, &mut hover, &flags);
            now += Duration::from_millis(10);
        }
        assert_eq!(reconciler.passes(), 1);
        assert_eq!(d.query_selector_all(".a11y-debug-focusable").unwrap().len(), 100);
    }

    #[test]
    fn test_missing_body() {
        let mut d = fos_dom::Document::empty("about:blank");
        let reconciler = MutationReconciler::new();
        assert!(matches!(reconciler.observe(&mut d), Err(A11yError::MissingBody)));
    }
}

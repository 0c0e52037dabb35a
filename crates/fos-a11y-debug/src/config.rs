//! Inspector configuration

use std::time::Duration;

use fos_a11y::DEBOUNCE_DELAY;
use fos_dom::Viewport;

/// Session configuration
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Quiet period before a mutation-triggered pass
    pub debounce_delay: Duration,
    /// Window size and scroll offset the document is viewed at
    pub viewport: Viewport,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            debounce_delay: DEBOUNCE_DELAY,
            viewport: Viewport::default(),
        }
    }
}

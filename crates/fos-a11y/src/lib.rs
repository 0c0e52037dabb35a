//! fOS Accessibility
//!
//! Accessibility debugging overlay for live documents.
//!
//! Features:
//! - Heuristic accessible name, role and state computation
//! - Marker classes for focusable elements, images without alt text and
//!   elements without an accessible name
//! - High-contrast mode
//! - Hover tooltip with a screen-reader style summary
//! - Debounced re-application on DOM mutations

mod document_host;
pub mod features;
pub mod host;
pub mod hover;
pub mod inspect;
pub mod overlay;
pub mod reconcile;

pub use features::{Feature, FeatureFlags};
pub use host::{DomHost, HostError, Mutation};
pub use hover::{HoverInspector, ScreenReaderSummary, TooltipPosition, place_tooltip};
pub use inspect::{accessible_name, accessible_role, state_and_properties};
pub use overlay::{
    apply_features, apply_screen_reader_info, dismiss_markers, set_focusable_highlight,
    set_high_contrast, set_missing_alt_highlight, set_missing_name_highlight,
};
pub use reconcile::{DEBOUNCE_DELAY, MutationReconciler};

/// Marker class for focusable elements
pub const FOCUSABLE_CLASS: &str = "a11y-debug-focusable";
/// Marker class for images without alternative text
pub const NO_ALT_CLASS: &str = "a11y-debug-no-alt";
/// Marker class for elements without an accessible name
pub const NO_NAME_CLASS: &str = "a11y-debug-no-accessible-name";
/// Class set on the document element in high-contrast mode
pub const HIGH_CONTRAST_CLASS: &str = "a11y-debug-high-contrast-mode";

/// The three per-element highlight markers
pub const HIGHLIGHT_CLASSES: [&str; 3] = [NO_NAME_CLASS, NO_ALT_CLASS, FOCUSABLE_CLASS];

/// Accessibility overlay error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("expected an element, got {0}")]
    NotAnElement(String),

    #[error("document has no body")]
    MissingBody,

    #[error(transparent)]
    Host(#[from] HostError),
}

pub type A11yResult<T> = Result<T, A11yError>;

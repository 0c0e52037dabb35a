//! fOS Accessibility Debugger
//!
//! The controller around the overlay engine: persisted feature flags, a
//! session that owns the document and routes host events into the engine,
//! and the configuration the CLI builds it from.

pub mod config;
pub mod session;
pub mod settings;

pub use config::InspectorConfig;
pub use session::Inspector;
pub use settings::{JsonFileStore, MemoryStore, SettingsError, SettingsStore, load_flags};

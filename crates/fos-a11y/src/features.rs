//! Feature flags
//!
//! Five independent switches, each persisted under a stable key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One overlay feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Focusable,
    NoAlt,
    NoAccessibleName,
    HighContrast,
    ScreenReaderInfo,
}

impl Feature {
    /// All features, in the order a full pass applies them
    pub const ALL: [Feature; 5] = [
        Feature::Focusable,
        Feature::NoAlt,
        Feature::NoAccessibleName,
        Feature::HighContrast,
        Feature::ScreenReaderInfo,
    ];

    /// Persisted settings key
    pub fn key(self) -> &'static str {
        match self {
            Self::Focusable => "a11yDebug_focusable",
            Self::NoAlt => "a11yDebug_noAlt",
            Self::NoAccessibleName => "a11yDebug_noAccessibleName",
            Self::HighContrast => "a11yDebug_highContrast",
            Self::ScreenReaderInfo => "a11yDebug_screenreaderInfo",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Control panel label
    pub fn label(self) -> &'static str {
        match self {
            Self::Focusable => "Highlight focusable elements",
            Self::NoAlt => "Images without alt",
            Self::NoAccessibleName => "Elements without an accessible name",
            Self::HighContrast => "High contrast",
            Self::ScreenReaderInfo => "Screen reader info (hover)",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Self::Focusable => "focusable",
            Self::NoAlt => "no-alt",
            Self::NoAccessibleName => "no-name",
            Self::HighContrast => "high-contrast",
            Self::ScreenReaderInfo => "screenreader-info",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Unknown feature name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature `{0}`")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    /// Accepts the short name or the settings key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.short_name().eq_ignore_ascii_case(s) || f.key() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Current state of every feature; all off by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    #[serde(rename = "a11yDebug_focusable")]
    pub focusable: bool,
    #[serde(rename = "a11yDebug_noAlt")]
    pub no_alt: bool,
    #[serde(rename = "a11yDebug_noAccessibleName")]
    pub no_accessible_name: bool,
    #[serde(rename = "a11yDebug_highContrast")]
    pub high_contrast: bool,
    #[serde(rename = "a11yDebug_screenreaderInfo")]
    pub screen_reader_info: bool,
}

impl FeatureFlags {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Focusable => self.focusable,
            Feature::NoAlt => self.no_alt,
            Feature::NoAccessibleName => self.no_accessible_name,
            Feature::HighContrast => self.high_contrast,
            Feature::ScreenReaderInfo => self.screen_reader_info,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::Focusable => &mut self.focusable,
            Feature::NoAlt => &mut self.no_alt,
            Feature::NoAccessibleName => &mut self.no_accessible_name,
            Feature::HighContrast => &mut self.high_contrast,
            Feature::ScreenReaderInfo => &mut self.screen_reader_info,
        };
        *slot = enabled;
    }

    /// `(feature, enabled)` pairs in application order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        Feature::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

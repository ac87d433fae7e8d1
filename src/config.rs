//! Configuration for the read-aloud engine.
//!
//! The matching tolerance and the scroll debounce interval are empirical
//! values tuned against real speech-engine offset behavior; both are exposed
//! here as tunable parameters rather than fixed requirements.

use std::time::Duration;

/// Element names whose subtrees are never read aloud or highlighted.
///
/// Reading markup syntax (scripts, styles, preformatted code) aloud is worse
/// than skipping the content entirely.
pub const DEFAULT_SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "pre", "code", "noscript"];

/// CSS class applied to every per-word wrapper span.
pub const DEFAULT_WRAPPER_CLASS: &str = "read-word";

/// Read-aloud engine configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Maximum distance (in characters) between an engine-reported offset and
    /// a word's offset for the proximity match tier to consider the word.
    pub proximity_tolerance_chars: usize,

    /// Trailing-edge debounce interval for auto-scroll requests.
    pub scroll_debounce: Duration,

    /// Element names excluded from flattening and word indexing.
    pub skipped_elements: Vec<String>,

    /// CSS class stamped on every word wrapper span.
    pub wrapper_class: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            proximity_tolerance_chars: 30,
            scroll_debounce: Duration::from_millis(300),
            skipped_elements: DEFAULT_SKIPPED_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            wrapper_class: DEFAULT_WRAPPER_CLASS.to_string(),
        }
    }

    /// Set the proximity match tolerance in characters.
    pub fn with_proximity_tolerance(mut self, chars: usize) -> Self {
        self.proximity_tolerance_chars = chars;
        self
    }

    /// Set the scroll debounce interval.
    pub fn with_scroll_debounce(mut self, interval: Duration) -> Self {
        self.scroll_debounce = interval;
        self
    }

    /// Replace the list of skipped element names.
    pub fn with_skipped_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skipped_elements = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the CSS class used for word wrapper spans.
    pub fn with_wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.wrapper_class = class.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ReaderConfig::new();
        assert_eq!(config.proximity_tolerance_chars, 30);
        assert_eq!(config.scroll_debounce, Duration::from_millis(300));
        assert!(config.skipped_elements.iter().any(|e| e == "script"));
        assert_eq!(config.wrapper_class, "read-word");
    }

    #[test]
    fn test_builder_setters() {
        let config = ReaderConfig::new()
            .with_proximity_tolerance(50)
            .with_scroll_debounce(Duration::from_millis(100))
            .with_skipped_elements(["script", "svg"])
            .with_wrapper_class("tts-word");
        assert_eq!(config.proximity_tolerance_chars, 50);
        assert_eq!(config.scroll_debounce, Duration::from_millis(100));
        assert_eq!(config.skipped_elements, vec!["script", "svg"]);
        assert_eq!(config.wrapper_class, "tts-word");
    }
}

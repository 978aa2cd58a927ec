//! Engine configuration.

use serde::Deserialize;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::RenderError;

/// Declaration prepended to every render result.
pub const DEFAULT_PREFIX: &str = "outline: none;\n";

/// Settings for a [`StyleEngine`](crate::StyleEngine).
///
/// Can be built in code or loaded from YAML/JSON; missing fields fall back to
/// their defaults.
///
/// # Example
///
/// ```rust
/// use tastycss::EngineConfig;
///
/// let config = EngineConfig::from_yaml("cache_capacity: 64").unwrap();
/// assert_eq!(config.cache_capacity, 64);
/// assert_eq!(config.prefix, "outline: none;\n");
///
/// let config = EngineConfig::new().cache_capacity(16).prefix("");
/// assert_eq!(config.cache_capacity, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Distinct renders kept before the cache is flushed.
    pub cache_capacity: usize,
    /// Text emitted before every rendered body, cache hits included.
    pub prefix: String,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn from_yaml(source: &str) -> Result<Self, RenderError> {
        serde_yaml::from_str(source).map_err(|e| RenderError::Config(e.to_string()))
    }

    pub fn from_json(source: &str) -> Result<Self, RenderError> {
        serde_json::from_str(source).map_err(|e| RenderError::Config(e.to_string()))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

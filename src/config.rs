use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default number of bills revealed per "load more" step
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default quiet period for free-text input
pub const DEFAULT_TEXT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Configuration for the search engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub page_size: usize,
    pub text_debounce: Duration,
    /// `None` keeps every distinct filter result for the session.
    pub cache_capacity: Option<usize>,
}

impl EngineConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            text_debounce: DEFAULT_TEXT_DEBOUNCE,
            cache_capacity: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("Page size must be at least 1".to_string()));
        }

        if self.cache_capacity == Some(0) {
            return Err(Error::Config(
                "Cache capacity must be at least 1 (omit it for an unbounded cache)".to_string(),
            ));
        }

        Ok(())
    }

    /// Load a configuration file. `.toml` files are read as TOML, anything
    /// else as YAML. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let raw: RawEngineConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents)?,
            _ => serde_yaml::from_str(&contents)?,
        };

        raw.into_builder().build()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk shape of the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawEngineConfig {
    page_size: Option<usize>,
    text_debounce_ms: Option<u64>,
    cache_capacity: Option<usize>,
}

impl RawEngineConfig {
    fn into_builder(self) -> EngineConfigBuilder {
        let mut builder = EngineConfigBuilder::new();
        if let Some(size) = self.page_size {
            builder = builder.page_size(size);
        }
        if let Some(ms) = self.text_debounce_ms {
            builder = builder.text_debounce(Duration::from_millis(ms));
        }
        if let Some(capacity) = self.cache_capacity {
            builder = builder.cache_capacity(capacity);
        }
        builder
    }
}

/// Builder for creating configurations
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
        }
    }

    /// Start from an existing configuration, e.g. one loaded from a file
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Set the page size
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the free-text debounce quiet period
    pub fn text_debounce(mut self, delay: Duration) -> Self {
        self.config.text_debounce = delay;
        self
    }

    /// Bound the result cache, evicting least-recently-used entries
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = Some(capacity);
        self
    }

    /// Keep every cached result for the session
    pub fn unbounded_cache(mut self) -> Self {
        self.config.cache_capacity = None;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

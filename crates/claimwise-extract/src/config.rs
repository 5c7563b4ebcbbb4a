//! Configuration for query extraction

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the query extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Whether to consult the LLM for fields the patterns miss
    pub llm_fill_enabled: bool,

    /// Maximum time for one extraction call, LLM included (seconds)
    pub extraction_timeout_secs: u64,
}

impl ExtractConfig {
    /// The extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Patterns-only preset: never calls the LLM
    pub fn patterns_only() -> Self {
        Self {
            llm_fill_enabled: false,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_text_length: 10_000,
            llm_fill_enabled: true,
            extraction_timeout_secs: 20,
        }
    }
}

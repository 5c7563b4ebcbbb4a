//! Pipeline configuration

use claimwise_chunker::ChunkerConfig;
use claimwise_engine::DecisionPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the claim pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of chunks retrieved per evaluation
    pub top_k: usize,

    /// Deadline for query extraction, LLM fill included (seconds)
    pub extraction_timeout_secs: u64,

    /// Deadline for a single embedding call (seconds)
    pub embedding_timeout_secs: u64,

    /// Chunker settings
    pub chunker: ChunkerConfig,

    /// Decision policy settings
    pub policy: DecisionPolicy,
}

impl PipelineConfig {
    /// The extraction deadline as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// The embedding deadline as a Duration
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    /// Validate all nested settings
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.embedding_timeout_secs == 0 {
            return Err("embedding_timeout_secs must be greater than 0".to_string());
        }
        self.chunker.validate()?;
        self.policy.validate()?;
        Ok(())
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

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            extraction_timeout_secs: 10,
            embedding_timeout_secs: 10,
            chunker: ChunkerConfig::default(),
            policy: DecisionPolicy::default(),
        }
    }
}

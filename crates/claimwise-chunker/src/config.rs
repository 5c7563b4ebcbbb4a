//! Configuration for the Chunker

use serde::{Deserialize, Serialize};

/// Configuration for the Chunker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum chunk size in bytes, overlap included
    pub max_chunk_chars: usize,

    /// Overlap carried from the previous chunk
    pub overlap_chars: usize,

    /// How far back from the hard cut to look for a sentence boundary
    pub boundary_search_window: usize,
}

impl Default for ChunkerConfig {
    /// Defaults tuned for policy clause text
    fn default() -> Self {
        Self {
            max_chunk_chars: 800,
            overlap_chars: 200,
            boundary_search_window: 100,
        }
    }
}

impl ChunkerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_chars == 0 {
            return Err("max_chunk_chars must be greater than 0".to_string());
        }
        if self.overlap_chars >= self.max_chunk_chars {
            return Err("overlap_chars must be smaller than max_chunk_chars".to_string());
        }
        if self.boundary_search_window > self.max_chunk_chars {
            return Err("boundary_search_window cannot exceed max_chunk_chars".to_string());
        }
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

//! Error types for query extraction

use claimwise_domain::ValidationError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Input text exceeds the configured maximum
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// LLM response did not contain parseable fields
    #[error("Invalid LLM response: {0}")]
    InvalidFormat(String),

    /// A present field failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        ExtractError::InvalidFormat(e.to_string())
    }
}

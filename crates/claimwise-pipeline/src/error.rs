//! Error types for pipeline operations

use claimwise_chunker::ChunkerError;
use claimwise_domain::{ContextId, DecisionId};
use claimwise_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the claim pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No documents have been ingested under the context
    #[error("Unknown context: {0}")]
    UnknownContext(ContextId),

    /// Referenced decision does not exist
    #[error("Decision not found: {0}")]
    DecisionNotFound(DecisionId),

    /// Query extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Query extraction exceeded its deadline
    #[error("Extraction timed out")]
    ExtractionTimeout,

    /// Embedding failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Embedding exceeded its deadline; safe to retry
    #[error("Embedding timed out")]
    EmbeddingTimeout,

    /// Chunking error
    #[error(transparent)]
    Chunker(#[from] ChunkerError),

    /// Storage error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

//! Claimwise Storage Layer
//!
//! In-memory retrieval stores plus a SQLite-backed decision/audit store:
//!
//! - [`VectorStore`]: exact cosine-similarity search over chunk embeddings,
//!   namespaced per document
//! - [`ContextStore`]: documents and chunks grouped by claim context, with
//!   role-precedence clause resolution
//! - [`MockEmbedder`]: deterministic hashed bag-of-words embeddings for
//!   tests and offline runs
//! - [`SqliteDecisionStore`]: append-only persistence for decisions,
//!   reasoning steps, and feedback records
//!
//! # Examples
//!
//! ```no_run
//! use claimwise_store::SqliteDecisionStore;
//!
//! let store = SqliteDecisionStore::new(":memory:").unwrap();
//! // Store is now ready for decision operations
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod decision_store;
pub mod embedding;
pub mod vector_store;

use thiserror::Error;

pub use context::{ContextStore, EffectiveClause, EffectiveClauses};
pub use decision_store::SqliteDecisionStore;
pub use embedding::{cosine_similarity, EmbeddingError, MockEmbedder};
pub use vector_store::{ScoredChunk, VectorRecord, VectorStore};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Embedding dimension does not match the store
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },
}

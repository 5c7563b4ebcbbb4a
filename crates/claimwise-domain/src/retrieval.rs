//! Retrieval results - similarity-ranked chunks with document context

use crate::document::Chunk;
use crate::role::DocumentRole;
use serde::{Deserialize, Serialize};

/// One retrieved chunk with its similarity score and source role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The retrieved chunk
    pub chunk: Chunk,

    /// Cosine similarity against the query vector, higher is closer
    pub similarity: f32,

    /// Role of the chunk's source document
    pub role: DocumentRole,
}

/// An ordered similarity-retrieval result
///
/// Re-derived per query; never persisted as authoritative state. Length is
/// bounded by the top-k parameter of the query that produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Retrieved chunks, best match first
    pub chunks: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    /// An empty result (no match is a signal, not an error)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether retrieval found anything
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of retrieved chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate chunks from authoritative roles only (correspondence is
    /// advisory and excluded from clause checks)
    pub fn authoritative(&self) -> impl Iterator<Item = &RetrievedChunk> {
        self.chunks.iter().filter(|c| c.role.is_authoritative())
    }
}

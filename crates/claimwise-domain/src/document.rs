//! Documents and chunks - the retrieval side of the domain model

use crate::ids::{ChunkId, DocumentId};
use crate::role::DocumentRole;
use serde::{Deserialize, Serialize};

/// A policy artifact ingested into a claim context
///
/// Documents are immutable once ingested. A newer amendment on the same
/// topic wins through precedence resolution; nothing is edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Role within the claim context
    pub role: DocumentRole,

    /// Full raw text as uploaded
    pub text: String,

    /// Upload timestamp (milliseconds since Unix epoch); recency tie-break
    /// within a role
    pub uploaded_at: u64,
}

impl Document {
    /// Create a new document
    pub fn new(role: DocumentRole, text: impl Into<String>, uploaded_at: u64) -> Self {
        Self {
            id: DocumentId::new(),
            role,
            text: text.into(),
            uploaded_at,
        }
    }
}

/// A bounded, overlapping segment of a document - the unit of retrieval
///
/// Chunks are immutable; re-ingesting a document produces fresh chunks (and
/// fresh embeddings). `overlap` records how many leading characters repeat
/// the tail of the previous chunk, so de-overlapped concatenation
/// reconstructs the source text exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier
    pub id: ChunkId,

    /// Owning document
    pub document_id: DocumentId,

    /// Position within the document (0-based)
    pub ordinal: usize,

    /// Chunk text, including the overlap prefix
    pub text: String,

    /// Byte offset of this chunk's start in the source text (always a char
    /// boundary)
    pub start: usize,

    /// Number of leading bytes shared with the previous chunk (always a
    /// char boundary)
    pub overlap: usize,
}

impl Chunk {
    /// The chunk text with the overlap prefix removed
    ///
    /// Concatenating `fresh_text` across a document's chunks in ordinal
    /// order reproduces the source text.
    pub fn fresh_text(&self) -> &str {
        &self.text[self.overlap..]
    }
}

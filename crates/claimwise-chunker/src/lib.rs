//! Claimwise Chunker
//!
//! Splits raw document text into overlapping chunks with positional
//! metadata. Chunks cover the entire text with no gaps; each chunk repeats
//! the tail of the previous one by a configurable overlap so clause
//! boundaries are not lost to a hard split.
//!
//! Boundaries prefer sentence and paragraph breaks inside a trailing search
//! window, falling back to a hard cut at a character boundary.
//!
//! # Examples
//!
//! ```
//! use claimwise_chunker::{Chunker, ChunkerConfig};
//! use claimwise_domain::DocumentId;
//!
//! let chunker = Chunker::new(ChunkerConfig::default());
//! let chunks = chunker.chunk(DocumentId::new(), "A short policy clause.").unwrap();
//! assert_eq!(chunks.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod config;

use claimwise_domain::{Chunk, ChunkId, DocumentId};
use thiserror::Error;

pub use config::ChunkerConfig;

/// Errors that can occur during chunking
#[derive(Error, Debug, PartialEq)]
pub enum ChunkerError {
    /// The document has no content to chunk
    #[error("Document is empty")]
    EmptyDocument,

    /// Invalid chunker configuration
    #[error("Invalid chunker configuration: {0}")]
    Config(String),
}

/// Sentence-ending characters considered boundary candidates
const SENTENCE_ENDINGS: [char; 4] = ['.', '!', '?', '\n'];

/// Splits document text into overlapping chunks
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a chunker with the given configuration
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunk the given document text
    ///
    /// Returns chunks in ordinal order covering the whole text. Empty or
    /// whitespace-only input fails with [`ChunkerError::EmptyDocument`];
    /// text shorter than one chunk produces exactly one chunk.
    pub fn chunk(&self, document_id: DocumentId, text: &str) -> Result<Vec<Chunk>, ChunkerError> {
        self.config
            .validate()
            .map_err(ChunkerError::Config)?;

        if text.trim().is_empty() {
            return Err(ChunkerError::EmptyDocument);
        }

        let max = self.config.max_chunk_chars;
        if text.len() <= max {
            return Ok(vec![Chunk {
                id: ChunkId::new(),
                document_id,
                ordinal: 0,
                text: text.to_string(),
                start: 0,
                overlap: 0,
            }]);
        }

        let mut chunks = Vec::new();
        // `fresh_start` walks the partition of the source text; each chunk
        // additionally reaches back `overlap` bytes into the previous
        // segment.
        let mut fresh_start = 0usize;
        let mut ordinal = 0usize;

        while fresh_start < text.len() {
            let overlap = if fresh_start == 0 {
                0
            } else {
                let back = fresh_start.saturating_sub(self.config.overlap_chars);
                fresh_start - align_ceil(text, back)
            };

            // The overlap counts against the chunk budget
            let fresh_budget = max - overlap;
            let end = self.segment_end(text, fresh_start, fresh_budget);

            let start = fresh_start - overlap;
            chunks.push(Chunk {
                id: ChunkId::new(),
                document_id,
                ordinal,
                text: text[start..end].to_string(),
                start,
                overlap,
            });

            fresh_start = end;
            ordinal += 1;
        }

        Ok(chunks)
    }

    /// Pick the end of the fresh segment starting at `from`
    ///
    /// Prefers the last sentence ending inside the trailing search window,
    /// as long as it is past the midpoint of the budget; otherwise hard-cuts
    /// at the budget on a char boundary.
    fn segment_end(&self, text: &str, from: usize, budget: usize) -> usize {
        let hard_end = align_floor(text, (from + budget).min(text.len()));
        if hard_end >= text.len() {
            return text.len();
        }

        let window_start = align_ceil(
            text,
            hard_end.saturating_sub(self.config.boundary_search_window),
        );
        let midpoint = from + budget / 2;

        let mut boundary = None;
        for (offset, ch) in text[window_start..hard_end].char_indices() {
            if SENTENCE_ENDINGS.contains(&ch) {
                boundary = Some(window_start + offset + ch.len_utf8());
            }
        }

        match boundary {
            Some(end) if end > midpoint && end > from => end,
            _ => hard_end.max(align_ceil(text, from + 1)),
        }
    }
}

/// Align an index down to the nearest char boundary
fn align_floor(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Align an index up to the nearest char boundary
fn align_ceil(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Reassemble source text from chunks by stripping overlap prefixes
///
/// The inverse of chunking; used by tests and audit tooling to verify the
/// total-partition invariant.
pub fn reassemble(chunks: &[Chunk]) -> String {
    chunks.iter().map(|c| c.fresh_text()).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: chunking is a total partition for any non-blank text
        #[test]
        fn test_chunk_partition_roundtrip(text in "[ -~]{1,4000}") {
            prop_assume!(!text.trim().is_empty());
            let chunker = Chunker::new(ChunkerConfig::default());
            let chunks = chunker.chunk(DocumentId::new(), &text).unwrap();
            prop_assert_eq!(reassemble(&chunks), text);
        }

        /// Property: no chunk exceeds the configured maximum
        #[test]
        fn test_chunk_size_bound(text in "[a-z. ]{1,4000}") {
            prop_assume!(!text.trim().is_empty());
            let config = ChunkerConfig::default();
            let chunker = Chunker::new(config.clone());
            let chunks = chunker.chunk(DocumentId::new(), &text).unwrap();
            for chunk in chunks {
                prop_assert!(chunk.text.len() <= config.max_chunk_chars);
            }
        }
    }
}

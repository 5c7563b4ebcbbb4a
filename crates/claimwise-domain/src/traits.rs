//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Implementations live in other crates: embeddings and
//! extraction sit behind pluggable capabilities, persistence behind the
//! decision store.

use crate::decision::DecisionResult;
use crate::feedback::FeedbackRecord;
use crate::ids::DecisionId;
use crate::query::StructuredQuery;

/// Trait for the embedding capability: text to fixed-length vector
///
/// Implementations may call out to a model service; callers are expected
/// to apply their own timeout around slow implementations.
pub trait Embedder {
    /// Error type for embedding operations
    type Error;

    /// Embed the given text into a fixed-length vector
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Dimension of the vectors this embedder produces
    fn dimension(&self) -> usize;
}

/// Trait for the language-understanding capability: free text to a
/// partial structured query
///
/// Fields the extractor cannot resolve with confidence stay unset; the
/// evaluator treats them as maximally uncertain rather than failing.
pub trait QueryExtractor {
    /// Error type for extraction operations
    type Error;

    /// Extract whatever structured fields the text supports
    fn extract(&self, text: &str) -> Result<StructuredQuery, Self::Error>;
}

/// Trait for persisting decisions and feedback
///
/// All mutation is append-only or single-object-atomic; no operation may
/// corrupt previously committed decisions or audit records.
pub trait DecisionStore {
    /// Error type for store operations
    type Error;

    /// Persist a decision and its reasoning tree atomically
    fn insert_decision(&mut self, decision: &DecisionResult) -> Result<(), Self::Error>;

    /// Fetch a decision by id
    fn get_decision(&self, id: DecisionId) -> Result<Option<DecisionResult>, Self::Error>;

    /// Revisions that supersede the given decision, oldest first
    fn revisions_of(&self, id: DecisionId) -> Result<Vec<DecisionResult>, Self::Error>;

    /// Append a feedback record; never mutates the referenced decision
    fn append_feedback(&mut self, record: &FeedbackRecord) -> Result<(), Self::Error>;

    /// Feedback records for a decision, in append order
    fn feedback_for(&self, id: DecisionId) -> Result<Vec<FeedbackRecord>, Self::Error>;
}

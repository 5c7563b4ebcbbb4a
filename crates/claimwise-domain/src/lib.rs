//! Claimwise Domain Layer
//!
//! This crate contains the core domain model for Claimwise: the types and
//! trait interfaces every other layer depends upon.
//!
//! ## Key Concepts
//!
//! - **Document**: a layered policy artifact (base policy, rider, amendment,
//!   correspondence) scoped to a claim context
//! - **Chunk**: a bounded, overlapping text segment of a document, the unit
//!   of retrieval
//! - **StructuredQuery**: the normalized claim description the evaluator
//!   consumes; missing fields mean "maximally uncertain", never a guess
//! - **DecisionResult**: an immutable, auditable accept/reject outcome with
//!   its reasoning tree
//! - **Precedence**: a total order over document roles deciding which clause
//!   wins when topics overlap
//!
//! ## Architecture
//!
//! Infrastructure implementations (vector search, SQLite persistence, LLM
//! providers) live in other crates behind the traits defined here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decision;
pub mod document;
pub mod feedback;
pub mod ids;
pub mod procedure;
pub mod query;
pub mod retrieval;
pub mod role;
pub mod traits;

// Re-exports for convenience
pub use decision::{
    AuditPayload, DecisionOutcome, DecisionResult, Evaluation, Factor, ReasoningStep, RiskFactor,
};
pub use document::{Chunk, Document};
pub use feedback::{FeedbackKind, FeedbackRecord};
pub use ids::{ChunkId, ContextId, DecisionId, DocumentId};
pub use procedure::{Procedure, ProcedureCategory};
pub use query::{ClaimRequest, Gender, StructuredQuery, ValidationError, NETWORK_CITIES};
pub use retrieval::{RetrievalResult, RetrievedChunk};
pub use role::DocumentRole;

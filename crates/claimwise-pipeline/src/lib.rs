//! Claimwise Pipeline
//!
//! The end-to-end claim processing facade: document ingestion, query
//! extraction, clause retrieval, weighted-factor evaluation, and the
//! feedback/audit loop behind one [`Pipeline`] type.
//!
//! # Flow
//!
//! ```text
//! Documents → Chunker → Embedder → VectorStore
//!                                      ↓
//! ClaimRequest → Extractor → Evaluator → DecisionStore → AuditPayload
//! ```
//!
//! # Example
//!
//! ```no_run
//! use claimwise_pipeline::{Pipeline, PipelineConfig};
//! use claimwise_store::{MockEmbedder, SqliteDecisionStore};
//! use claimwise_extract::{ExtractConfig, PatternExtractor};
//! use claimwise_domain::{ClaimRequest, ContextId, DocumentRole};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(
//!     MockEmbedder::default(),
//!     PatternExtractor::new(ExtractConfig::default()),
//!     SqliteDecisionStore::new(":memory:")?,
//!     PipelineConfig::default(),
//! )?;
//!
//! let context = ContextId::new();
//! pipeline
//!     .ingest_document(context, DocumentRole::BasePolicy, "Dental treatment is covered.")
//!     .await?;
//!
//! let request = ClaimRequest::FreeText("35F, dental work in Mumbai, 12 month policy".into());
//! let decision = pipeline.evaluate(context, &request).await?;
//! println!("{}", decision.evaluation.outcome.as_str());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod pipeline;

pub use claimwise_engine::render_breakdown;
pub use claimwise_store::{EffectiveClause, EffectiveClauses};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use metrics::PipelineMetrics;
pub use pipeline::Pipeline;

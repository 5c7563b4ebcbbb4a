//! Claimwise Decision Engine
//!
//! The weighted-factor evaluator at the heart of the pipeline. Given a
//! structured query, the retrieved clauses, and a [`DecisionPolicy`], it
//! produces an [`Evaluation`](claimwise_domain::Evaluation): outcome,
//! confidence, coverage tier, risk tags, and a reasoning step for every
//! factor.
//!
//! The evaluator is a pure function. Identical inputs always yield the
//! identical evaluation; persistence identity (ids, timestamps) is stamped
//! on downstream.
//!
//! # Example
//!
//! ```
//! use claimwise_engine::{evaluate, DecisionPolicy};
//! use claimwise_domain::{Procedure, RetrievalResult, StructuredQuery};
//!
//! let query = StructuredQuery {
//!     age: Some(35),
//!     procedure: Some(Procedure::normalize("dental treatment")),
//!     location: Some("Mumbai".to_string()),
//!     policy_duration_months: Some(12),
//!     claim_amount: Some(50_000),
//!     gender: None,
//! };
//! let evaluation = evaluate(
//!     &query,
//!     &RetrievalResult::empty(),
//!     None,
//!     &DecisionPolicy::default(),
//! );
//! assert!(evaluation.confidence > 0.0);
//! ```

#![warn(missing_docs)]

mod breakdown;
mod config;
mod evaluator;

pub use breakdown::render_breakdown;
pub use config::{DecisionPolicy, FactorWeights};
pub use evaluator::evaluate;

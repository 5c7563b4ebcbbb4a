//! Claimwise Query Extraction
//!
//! Turns claim descriptions into the structured query the evaluator
//! consumes. Extraction is two-stage: deterministic regex patterns first,
//! then an optional LLM pass that fills only the fields the patterns
//! missed. Pattern results are never overwritten, and a model failure
//! degrades to the pattern result instead of failing the claim.
//!
//! # Example
//!
//! ```
//! use claimwise_extract::{ExtractConfig, PatternExtractor};
//! use claimwise_domain::traits::QueryExtractor;
//!
//! let extractor = PatternExtractor::new(ExtractConfig::default());
//! let query = extractor
//!     .extract("46-year-old male, knee surgery in Pune, 3-month-old insurance policy")
//!     .unwrap();
//! assert_eq!(query.age, Some(46));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod patterns;
mod prompt;

pub use config::ExtractConfig;
pub use error::ExtractError;
pub use extractor::{resolve_request, LlmQueryExtractor, PatternExtractor};
pub use patterns::extract_fields;

//! Query extractors: patterns only, and patterns plus LLM fill

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::parser::parse_fill_response;
use crate::patterns::extract_fields;
use crate::prompt::build_fill_prompt;
use claimwise_domain::traits::QueryExtractor;
use claimwise_domain::{ClaimRequest, StructuredQuery};
use claimwise_llm::LlmProvider;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pattern-only extractor with no model dependency
///
/// Fields the patterns miss stay unset; suitable for offline runs and as
/// the degraded mode the LLM-backed extractor falls back to.
#[derive(Debug, Clone, Default)]
pub struct PatternExtractor {
    config: ExtractConfig,
}

impl PatternExtractor {
    /// Create an extractor with the given configuration
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }
}

impl QueryExtractor for PatternExtractor {
    type Error = ExtractError;

    fn extract(&self, text: &str) -> Result<StructuredQuery, Self::Error> {
        if text.len() > self.config.max_text_length {
            return Err(ExtractError::TextTooLong(
                text.len(),
                self.config.max_text_length,
            ));
        }
        let query = extract_fields(text);
        query.validate()?;
        Ok(query)
    }
}

/// Pattern extractor backed by an LLM for fields the patterns miss
///
/// The pattern pass runs first and its results are authoritative; the
/// model only fills gaps. A model failure degrades to the pattern result
/// instead of failing the claim, so a down model never blocks evaluation.
#[derive(Debug, Clone)]
pub struct LlmQueryExtractor<P> {
    provider: Arc<P>,
    config: ExtractConfig,
}

impl<P: LlmProvider> LlmQueryExtractor<P> {
    /// Create an extractor around the given provider
    pub fn new(provider: P, config: ExtractConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }
}

impl<P> QueryExtractor for LlmQueryExtractor<P>
where
    P: LlmProvider,
    P::Error: std::fmt::Display,
{
    type Error = ExtractError;

    fn extract(&self, text: &str) -> Result<StructuredQuery, Self::Error> {
        if text.len() > self.config.max_text_length {
            return Err(ExtractError::TextTooLong(
                text.len(),
                self.config.max_text_length,
            ));
        }

        let mut query = extract_fields(text);

        if !query.is_complete() && self.config.llm_fill_enabled {
            let prompt = build_fill_prompt(text, &query);
            match self.provider.generate(&prompt) {
                Ok(response) => match parse_fill_response(&response) {
                    Ok(filled) => {
                        debug!("LLM filled missing query fields");
                        query.merge_missing(filled);
                    }
                    Err(e) => {
                        warn!(error = %e, "LLM fill response unusable; continuing with pattern fields");
                    }
                },
                Err(e) => {
                    warn!(error = %e, "LLM fill unavailable; continuing with pattern fields");
                }
            }
        }

        query.validate()?;
        Ok(query)
    }
}

/// Turn a claim request into a structured query using the given extractor
///
/// Structured requests are validated and passed through untouched; free
/// text goes through extraction.
pub fn resolve_request<X>(extractor: &X, request: &ClaimRequest) -> Result<StructuredQuery, X::Error>
where
    X: QueryExtractor,
    X::Error: From<claimwise_domain::ValidationError>,
{
    match request {
        ClaimRequest::Structured(query) => {
            query.validate()?;
            Ok(query.clone())
        }
        ClaimRequest::FreeText(text) => extractor.extract(text),
    }
}

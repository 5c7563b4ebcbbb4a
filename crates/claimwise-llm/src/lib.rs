//! Claimwise LLM Provider Layer
//!
//! Pluggable language-model backends behind a single [`LlmProvider`] trait.
//! The extraction layer uses a provider to fill query fields that regex
//! patterns cannot resolve; everything else in the pipeline is
//! provider-agnostic.
//!
//! # Providers
//!
//! - [`MockProvider`]: deterministic scripted responses for tests
//! - [`OllamaProvider`]: local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use claimwise_llm::{LlmProvider, MockProvider};
//!
//! let provider = MockProvider::new(r#"{"location": "Pune"}"#);
//! let result = provider.generate("extract fields").unwrap();
//! assert_eq!(result, r#"{"location": "Pune"}"#);
//! ```

#![warn(missing_docs)]

pub mod ollama;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors raised by model backends
#[derive(Error, Debug)]
pub enum LlmError {
    /// The backend could not be reached at all
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The backend answered but the payload was not usable
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// The requested model is not installed on the backend
    #[error("Model not installed: {0}")]
    ModelMissing(String),

    /// Failure in the sync-over-async bridge
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// A text-generation backend
///
/// Implementations are synchronous; async callers wrap them in
/// `spawn_blocking` and apply their own timeout.
pub trait LlmProvider {
    /// Error type raised by this backend
    type Error;

    /// Produce a completion for the prompt
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Scripted provider for deterministic tests
///
/// Responses are keyed by exact prompt; prompts without a script fall back
/// to the default response. Clones share the script and the call counter.
///
/// # Examples
///
/// ```
/// use claimwise_llm::{LlmProvider, MockProvider};
///
/// let mut provider = MockProvider::default();
/// provider.add_response("q1", "a1");
/// assert_eq!(provider.generate("q1").unwrap(), "a1");
/// assert_eq!(provider.generate("anything else").unwrap(), "{}");
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    fallback: String,
    script: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Provider that answers every prompt with the same response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            fallback: response.into(),
            script: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Script a response for one exact prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .insert(prompt.into(), Ok(response.into()));
    }

    /// Script a failure for one exact prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .insert(prompt.into(), Err("scripted failure".to_string()));
    }

    /// How many times `generate` ran, across all clones
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    /// Zero the call counter
    pub fn reset_call_count(&self) {
        *self.calls.lock().unwrap() = 0;
    }
}

impl Default for MockProvider {
    /// A provider whose fallback is an empty JSON object, matching what a
    /// model with nothing to add would say in a field-fill exchange
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *self.calls.lock().unwrap() += 1;

        match self.script.lock().unwrap().get(prompt) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(LlmError::Transport(message.clone())),
            None => Ok(self.fallback.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_answers_unscripted_prompts() {
        let provider = MockProvider::new("fixed");
        assert_eq!(provider.generate("any prompt").unwrap(), "fixed");
        assert_eq!(provider.generate("another").unwrap(), "fixed");
    }

    #[test]
    fn test_scripted_responses_win_over_fallback() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");

        assert_eq!(provider.generate("hello").unwrap(), "world");
        assert_eq!(provider.generate("unknown").unwrap(), "{}");
    }

    #[test]
    fn test_scripted_failure() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        assert!(matches!(
            provider.generate("bad prompt"),
            Err(LlmError::Transport(_))
        ));
    }

    #[test]
    fn test_call_counter_shared_across_clones() {
        let provider = MockProvider::new("x");
        let clone = provider.clone();

        provider.generate("a").unwrap();
        clone.generate("b").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(clone.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(clone.call_count(), 0);
    }
}

//! Local Ollama backend
//!
//! Talks to the Ollama HTTP API in non-streaming mode. Local inference
//! keeps claim text on the machine; nothing leaves the host. Transport
//! failures and 5xx answers are retried with exponential backoff; a 404
//! means the model is not pulled and is never retried.

use crate::{LlmError, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoint used by [`OllamaProvider::local`]
pub const LOCAL_ENDPOINT: &str = "http://localhost:11434";

/// Per-request wall clock limit
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Attempts made before giving up on a retryable failure
pub const DEFAULT_ATTEMPTS: u32 = 3;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

enum Attempt {
    Done(String),
    Fatal(LlmError),
    Retry(LlmError),
}

/// Provider backed by a local Ollama instance
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    attempts: u32,
}

impl OllamaProvider {
    /// Provider for an explicit endpoint and model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Provider against the default local endpoint
    pub fn local(model: impl Into<String>) -> Self {
        Self::new(LOCAL_ENDPOINT, model)
    }

    /// Override the attempt budget
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    async fn attempt(&self, prompt: &str) -> Attempt {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let url = format!("{}/api/generate", self.endpoint);

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(LlmError::Transport(e.to_string())),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Attempt::Fatal(LlmError::ModelMissing(self.model.clone()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = LlmError::Http {
                status: status.as_u16(),
                body,
            };
            return if status.is_server_error() {
                Attempt::Retry(error)
            } else {
                Attempt::Fatal(error)
            };
        }

        match response.json::<GenerateResponse>().await {
            Ok(parsed) => Attempt::Done(parsed.response),
            Err(e) => Attempt::Fatal(LlmError::Malformed(e.to_string())),
        }
    }

    /// Generate a completion, retrying transport and 5xx failures
    pub async fn generate_async(&self, prompt: &str) -> Result<String, LlmError> {
        let mut last = None;
        for round in 0..self.attempts {
            if round > 0 {
                // 1s, 2s, 4s between rounds
                tokio::time::sleep(Duration::from_secs(1 << (round - 1))).await;
            }
            match self.attempt(prompt).await {
                Attempt::Done(text) => return Ok(text),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retry(error) => last = Some(error),
            }
        }
        Err(last.unwrap_or_else(|| LlmError::Transport("no attempts made".to_string())))
    }
}

impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Runtime(e.to_string()))?;
        runtime.block_on(self.generate_async(prompt))
    }
}

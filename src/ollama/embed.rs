//! Ollama embeddings client (`/api/embed`)

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Deserialize;

use super::chat::api_error_message;

/// Error type for embedding requests
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Ollama returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("expected {expected} embeddings, got {got}")]
    CountMismatch { expected: usize, got: usize },
}

/// Turns text into vectors.
pub trait Embedder: Send + Sync {
    /// Embed every input, returning one vector per input in the same order.
    fn embed<'a>(&'a self, inputs: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, EmbedError>>;
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for Ollama's embedding endpoint, bound to one model.
#[derive(Clone)]
pub struct EmbedClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl EmbedClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let endpoint = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(&endpoint)
            .json(&serde_json::json!({
                "model": self.model,
                "input": inputs,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let body: EmbedResponse = response.json().await?;
        if body.embeddings.len() != inputs.len() {
            return Err(EmbedError::CountMismatch {
                expected: inputs.len(),
                got: body.embeddings.len(),
            });
        }
        Ok(body.embeddings)
    }
}

impl Embedder for EmbedClient {
    fn embed<'a>(&'a self, inputs: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, EmbedError>> {
        Box::pin(self.request(inputs))
    }
}

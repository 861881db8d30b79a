//! Ollama backend implementation.
//!
//! Ollama is a local LLM server; chat requests go to `POST /api/chat`.

use super::{BackendError, ChatBackend};
use crate::protocol::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Ollama backend for local LLM inference.
#[derive(Debug)]
pub struct OllamaBackend {
    model: String,
    host: String,
    client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    ///
    /// Chat calls carry no timeout: a turn waits as long as the model takes.
    pub fn new(model: impl Into<String>, host: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::builder().build().map_err(BackendError::Client)?;

        Ok(Self {
            model: model.into(),
            host: host.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), BackendError> {
        let url = format!("{}/api/tags", self.host);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(BackendError::Status { status, body })
        }
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let url = format!("{}/api/chat", self.host);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        response.json().await.map_err(BackendError::Malformed)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

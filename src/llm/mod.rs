//! LLM backend interface.
//!
//! The session talks to the model through [`ChatBackend`]. The only real
//! implementation is the local Ollama server.

pub mod ollama;

use crate::protocol::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use ollama::OllamaBackend;

/// Why a chat request produced no reply.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to connect to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(#[source] reqwest::Error),
}

/// A service that answers a chat request with a single reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one request and wait for the full reply.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;

    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Model the backend was configured with.
    fn model(&self) -> &str;
}

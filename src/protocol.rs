//! Wire types for the Ollama chat API and the per-turn record.
//!
//! Requests are always single-message and non-streaming: no conversation
//! context is carried from one turn to the next.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// A message authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Always false; replies are read in one piece.
    pub stream: bool,
}

impl ChatRequest {
    /// A one-message conversation carrying `text` under the user role.
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(text)],
            stream: false,
        }
    }
}

/// Reply from `POST /api/chat`. Fields we don't read are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Pending,
    Replied(String),
    Failed(String),
}

/// One request/response cycle, kept only until it has been logged.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub user_text: String,
    pub timestamp: DateTime<Local>,
    pub outcome: TurnOutcome,
}

impl ChatTurn {
    /// Start a turn for `user_text`, stamped with the current local time.
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            timestamp: Local::now(),
            outcome: TurnOutcome::Pending,
        }
    }

    /// Record a successful reply.
    pub fn reply(&mut self, reply: impl Into<String>) {
        self.outcome = TurnOutcome::Replied(reply.into());
    }

    /// Record a failure description in place of a reply.
    pub fn fail(&mut self, description: impl Into<String>) {
        self.outcome = TurnOutcome::Failed(description.into());
    }
}

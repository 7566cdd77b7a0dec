//! Model provider abstractions.
//!
//! Defines the [`ModelProvider`] trait, the [`ChatMessage`] type shared
//! with the chat transcript, and the concrete backends
//! ([`GeminiProvider`], [`OpenAICompatProvider`]).

pub mod gemini;
pub mod openai_compat;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAICompatProvider;

// ---------------------------------------------------------------------------
// ChatMessage – shared message representation
// ---------------------------------------------------------------------------

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ModelProvider trait
// ---------------------------------------------------------------------------

/// Trait implemented by every LLM backend.
///
/// A provider is stateless: the caller passes the system instruction and
/// the full conversation so far, and gets the next model turn back.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send the conversation and return the model's reply text.
    async fn send_chat(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<String, anyhow::Error>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// HTTP client shared by the providers (90s request, 10s connect).
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

//! Generic OpenAI-compatible provider.
//!
//! Works with any API that implements the OpenAI chat completions
//! interface: OpenAI itself, OpenRouter, Ollama, Groq, LM Studio, vLLM, etc.
//!
//! Config example:
//! ```yaml
//! assistant:
//!   provider: openai-compat
//!   model: llama3
//!   endpoint: http://localhost:11434/v1/chat/completions
//!   api_key: $OLLAMA_KEY   # optional, some local servers need none
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{ChatMessage, ModelProvider, Role};

/// Default endpoint when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Provider that talks to any OpenAI-compatible chat completions API.
pub struct OpenAICompatProvider {
    api_key: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl OpenAICompatProvider {
    /// Create a provider with explicit configuration.
    ///
    /// `api_key` may be empty for local servers that don't require auth.
    pub fn new(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            api_key,
            endpoint,
            model,
            client: super::http_client(),
        }
    }
}

/// Serialise the system instruction and history into the OpenAI
/// `messages` array. Model turns map to the `assistant` role.
pub fn serialize_messages(
    system_instruction: &str,
    history: &[ChatMessage],
) -> Vec<serde_json::Value> {
    std::iter::once(json!({ "role": "system", "content": system_instruction }))
        .chain(history.iter().map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Model => "assistant",
            };
            json!({ "role": role, "content": m.text })
        }))
        .collect()
}

#[async_trait]
impl ModelProvider for OpenAICompatProvider {
    async fn send_chat(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<String, anyhow::Error> {
        let body = json!({
            "model": self.model,
            "messages": serialize_messages(system_instruction, history),
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI-compat API returned {status}: {text}");
        }

        let json: serde_json::Value = resp.json().await?;
        match json["choices"][0]["message"]["content"].as_str() {
            Some(content) if !content.is_empty() => Ok(content.to_string()),
            _ => anyhow::bail!("OpenAI-compat API returned no content"),
        }
    }

    fn name(&self) -> &'static str {
        "openai-compat"
    }
}

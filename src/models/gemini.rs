//! Google Gemini `generateContent` provider.
//!
//! Config example:
//! ```yaml
//! assistant:
//!   provider: gemini
//!   model: gemini-3-flash-preview
//!   api_key: $API_KEY
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{ChatMessage, ModelProvider, Role};

/// Public Gemini API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Provider that talks to the Gemini REST API.
pub struct GeminiProvider {
    api_key: String,
    /// Base URL; the request goes to `{endpoint}/models/{model}:generateContent`.
    endpoint: String,
    model: String,
    client: Client,
}

impl GeminiProvider {
    /// Create a provider against `endpoint` ([`DEFAULT_ENDPOINT`] for the
    /// public API).
    pub fn with_endpoint(api_key: String, endpoint: String, model: String) -> Self {
        Self {
            api_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            client: super::http_client(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Build the `generateContent` request body.
pub fn request_body(system_instruction: &str, history: &[ChatMessage]) -> serde_json::Value {
    let contents: Vec<serde_json::Value> = history
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Model => "model",
            };
            json!({ "role": role, "parts": [{ "text": m.text }] })
        })
        .collect();

    json!({
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "contents": contents,
    })
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(json: &serde_json::Value) -> Option<String> {
    let parts = json["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn send_chat(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<String, anyhow::Error> {
        let body = request_body(system_instruction, history);

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API returned {status}: {text}");
        }

        let json: serde_json::Value = resp.json().await?;
        match extract_text(&json) {
            Some(text) => Ok(text),
            None => {
                let reason = json["promptFeedback"]["blockReason"]
                    .as_str()
                    .or_else(|| json["candidates"][0]["finishReason"].as_str())
                    .unwrap_or("no text in response");
                anyhow::bail!("Gemini API returned no content: {reason}")
            }
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

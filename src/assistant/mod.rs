//! Assistant session gateway and chat state.
//!
//! [`create_session`] and [`send_message`] form the boundary to the
//! external model: every failure on this path is absorbed here and turned
//! into a fixed reply string, so callers only ever see text. [`Chat`] owns
//! the transcript and the lazily created session for one conversation.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::catalog::Tool;
use crate::config::{AssistantConfig, ProviderKind};
use crate::context;
use crate::models::{
    gemini, openai_compat, ChatMessage, GeminiProvider, ModelProvider, OpenAICompatProvider,
};

/// First model turn of every transcript.
pub const GREETING: &str =
    "Привет! Я знаю всё об инструментах в этом списке. Спрашивай, помогу подобрать нужное!";

/// Reply when no credential is configured.
pub const MISSING_KEY_REPLY: &str = "Ошибка: API ключ не настроен.";

/// Reply when a round-trip to the backend fails.
pub const TRANSPORT_ERROR_REPLY: &str =
    "Извините, произошла ошибка при обращении к AI. Попробуйте позже.";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Resolved assistant settings: provider choice, credential and the
/// instruction template text.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: Option<String>,
    /// `None` disables the assistant.
    pub api_key: Option<String>,
    pub instruction_template: String,
}

impl AssistantSettings {
    /// Resolve the credential and read the instruction override, if any.
    pub async fn from_config(config: &AssistantConfig) -> anyhow::Result<Self> {
        let instruction_template = match config.instruction_path.as_deref() {
            Some(raw) => {
                let path = Path::new(raw);
                let path = if path.is_relative() {
                    crate::toolshelf_home().join(path)
                } else {
                    path.to_path_buf()
                };
                tokio::fs::read_to_string(&path).await.with_context(|| {
                    format!("failed to read instruction template: {}", path.display())
                })?
            }
            None => context::DEFAULT_INSTRUCTION.to_string(),
        };

        Ok(Self {
            provider: config.provider,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            api_key: config.resolve_api_key(),
            instruction_template,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the configured backend, or `None` without a credential.
    pub fn build_provider(&self) -> Option<Arc<dyn ModelProvider>> {
        let api_key = self.api_key.clone()?;
        let provider: Arc<dyn ModelProvider> = match self.provider {
            ProviderKind::Gemini => Arc::new(GeminiProvider::with_endpoint(
                api_key,
                self.endpoint
                    .clone()
                    .unwrap_or_else(|| gemini::DEFAULT_ENDPOINT.to_string()),
                self.model.clone(),
            )),
            ProviderKind::OpenaiCompat => Arc::new(OpenAICompatProvider::new(
                self.endpoint
                    .clone()
                    .unwrap_or_else(|| openai_compat::DEFAULT_ENDPOINT.to_string()),
                api_key,
                self.model.clone(),
            )),
        };
        Some(provider)
    }
}

// ---------------------------------------------------------------------------
// Session gateway
// ---------------------------------------------------------------------------

/// An open conversation with the backend: the provider, the grounding
/// instruction it was seeded with, and the turns exchanged so far.
pub struct AssistantSession {
    provider: Arc<dyn ModelProvider>,
    system_instruction: String,
    history: Vec<ChatMessage>,
}

impl AssistantSession {
    pub fn new(provider: Arc<dyn ModelProvider>, system_instruction: String) -> Self {
        Self {
            provider,
            system_instruction,
            history: Vec::new(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

/// Open a session seeded with the catalog context.
///
/// Returns `None` when no credential is configured; callers treat that
/// as "assistant unavailable".
pub fn create_session(
    settings: &AssistantSettings,
    tools: &[Tool],
    today: NaiveDate,
) -> Option<AssistantSession> {
    let Some(provider) = settings.build_provider() else {
        warn!("assistant API key is missing, assistant disabled");
        return None;
    };
    let instruction =
        context::build_system_instruction(tools, &settings.instruction_template, today);
    info!(
        provider = provider.name(),
        model = %settings.model,
        tools = tools.len(),
        instruction_chars = instruction.chars().count(),
        "assistant session created"
    );
    Some(AssistantSession::new(provider, instruction))
}

/// Send `text` as a user turn and return the model's reply.
///
/// Never fails: a missing session yields [`MISSING_KEY_REPLY`] without
/// touching the network, and any backend error yields
/// [`TRANSPORT_ERROR_REPLY`]. A failed turn is dropped from the session
/// history so the next attempt starts from a consistent conversation.
pub async fn send_message(session: Option<&mut AssistantSession>, text: &str) -> String {
    let Some(session) = session else {
        return MISSING_KEY_REPLY.to_string();
    };

    session.history.push(ChatMessage::user(text));
    let result = session
        .provider
        .send_chat(&session.system_instruction, &session.history)
        .await;
    match result {
        Ok(reply) => {
            debug!(
                provider = session.provider.name(),
                turns = session.history.len(),
                "assistant replied"
            );
            session.history.push(ChatMessage::model(reply.clone()));
            reply
        }
        Err(e) => {
            warn!(provider = session.provider.name(), error = %e, "assistant request failed");
            session.history.pop();
            TRANSPORT_ERROR_REPLY.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Chat state
// ---------------------------------------------------------------------------

/// One conversation: the visible transcript plus the backend session.
///
/// The session is created lazily and then reused for every turn. While
/// none exists, creation is attempted again on each send.
pub struct Chat {
    settings: AssistantSettings,
    session: Option<AssistantSession>,
    messages: Vec<ChatMessage>,
}

impl Chat {
    pub fn new(settings: AssistantSettings) -> Self {
        Self {
            settings,
            session: None,
            messages: vec![ChatMessage::model(GREETING)],
        }
    }

    /// Transcript so far, oldest first, starting with [`GREETING`].
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Eagerly open the session when the chat panel is shown, as long as
    /// there is something to talk about.
    pub fn open(&mut self, tools: &[Tool]) {
        if self.session.is_none() && !tools.is_empty() {
            self.session = create_session(&self.settings, tools, today());
        }
    }

    /// Append `text` and the assistant's reply to the transcript.
    ///
    /// Returns `None` (and records nothing) for blank input.
    pub async fn send(&mut self, text: &str, tools: &[Tool]) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(text));

        if self.session.is_none() {
            self.session = create_session(&self.settings, tools, today());
        }

        let reply = send_message(self.session.as_mut(), text).await;
        self.messages.push(ChatMessage::model(reply.clone()));
        Some(reply)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

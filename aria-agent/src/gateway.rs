//! Completion gateway: memory in, provider call, memory out

use std::sync::Arc;

use aria_core::config::Config;
use aria_core::conversation::{ConversationEntry, ConversationStore};
use aria_core::Clock;
use aria_providers::{GenerationParams, LLMProvider, ProviderError};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::context::ContextBuilder;
use crate::knowledge::ARIA;

/// Returned in place of a generated reply whenever the provider call fails
pub const FALLBACK_REPLY: &str = "I'm experiencing a temporary connection issue with my data processors. 

🔄 QUICK SOLUTIONS:
• Refresh and try again in a moment
• Visit airnewzealand.co.nz for live booking
• Call 0800 737 000 for immediate assistance
• Check our mobile app for real-time flight info

My systems are usually back online quickly. No worries - I'll be here to help!";

/// Why a chat turn did not produce a generated reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network failure or timeout reaching the provider
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Non-success status or unusable body from the provider
    #[error("Provider rejected request: {0}")]
    ProviderRejected(String),

    /// Absent or blank user message
    #[error("Message is required")]
    MissingInput,
}

impl From<ProviderError> for GatewayError {
    fn from(e: ProviderError) -> Self {
        if e.is_unavailable() {
            GatewayError::ProviderUnavailable(e.to_string())
        } else {
            GatewayError::ProviderRejected(e.to_string())
        }
    }
}

/// Reject absent or whitespace-only messages before they reach the gateway
///
/// Accepted text is returned as sent, surrounding whitespace included.
pub fn validate_message(message: Option<&str>) -> Result<&str, GatewayError> {
    match message {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GatewayError::MissingInput),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Completed,
    Fallback(GatewayError),
}

/// Caller-facing result of one chat turn
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

impl ChatReply {
    fn completed(text: String) -> Self {
        Self {
            text,
            outcome: ReplyOutcome::Completed,
        }
    }

    fn fallback(error: GatewayError) -> Self {
        Self {
            text: FALLBACK_REPLY.to_string(),
            outcome: ReplyOutcome::Fallback(error),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, ReplyOutcome::Fallback(_))
    }
}

/// Model and sampling settings for gateway requests
#[derive(Debug, Clone, Default)]
pub struct GatewaySettings {
    /// `None` uses the provider's default model
    pub model: Option<String>,
    pub params: GenerationParams,
}

/// Answers chat messages using the provider and per-client memory
pub struct CompletionGateway {
    store: Arc<ConversationStore>,
    provider: Arc<dyn LLMProvider>,
    clock: Arc<dyn Clock>,
    context: ContextBuilder,
    settings: GatewaySettings,
}

impl CompletionGateway {
    pub fn new(
        store: Arc<ConversationStore>,
        provider: Arc<dyn LLMProvider>,
        clock: Arc<dyn Clock>,
        context: ContextBuilder,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            store,
            provider,
            clock,
            context,
            settings,
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<ConversationStore>,
        provider: Arc<dyn LLMProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let context = ContextBuilder::new(
            &ARIA,
            config.memory.prompt_context_entries,
            config.memory.context_turns,
        );
        let settings = GatewaySettings {
            model: Some(config.provider.model.clone()),
            params: GenerationParams::from(&config.generation),
        };
        Self::new(store, provider, clock, context, settings)
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Answer `message` for `client_id`
    ///
    /// Records the user message, makes exactly one provider call and
    /// records the assistant reply only when that call succeeds. Never
    /// fails: provider errors turn into [`FALLBACK_REPLY`].
    pub async fn respond(&self, client_id: &str, message: &str) -> ChatReply {
        let span = info_span!("respond", client_id = %client_id);
        self.respond_inner(client_id, message).instrument(span).await
    }

    async fn respond_inner(&self, client_id: &str, message: &str) -> ChatReply {
        self.store.get_or_create(client_id);
        let user_entry = ConversationEntry::user(message, self.clock.now());
        self.store.append(client_id, user_entry.clone());

        let mut history = self.store.recent(client_id, self.store.max_history());
        if history.is_empty() {
            // swept between append and read
            history.push(user_entry);
        }

        let messages = self.context.build_messages(&history, message);
        debug!(
            "Calling provider with {} messages ({} history entries)",
            messages.len(),
            history.len()
        );

        match self
            .provider
            .chat(messages, self.settings.model.clone(), self.settings.params)
            .await
        {
            Ok(response) => {
                let reply = response.content;
                self.store.append(
                    client_id,
                    ConversationEntry::assistant(&reply, self.clock.now()),
                );
                info!(
                    "Reply ready ({} chars, {} tokens)",
                    reply.chars().count(),
                    response.usage.total_tokens
                );
                ChatReply::completed(reply)
            }
            Err(e) => {
                let error = GatewayError::from(e);
                warn!("AI Brain Error: {}", error);
                ChatReply::fallback(error)
            }
        }
    }
}

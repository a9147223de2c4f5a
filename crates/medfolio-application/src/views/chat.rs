//! ChatPane - conversation with the assistant.

use std::sync::Arc;

use medfolio_core::chat::ChatMessage;
use medfolio_core::{BackendApi, MedfolioError, Result};
use tokio::sync::RwLock;

use crate::busy::BusyFlag;

/// Shown in place of a reply when the request fails.
pub const CHAT_FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Append-only transcript.
#[derive(Debug, Clone, Default)]
pub struct ChatPane {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
    sending: BusyFlag,
}

impl ChatPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_busy()
    }

    pub fn can_send(&self, input: &str) -> bool {
        !self.sending.is_busy() && !input.trim().is_empty()
    }

    /// Appends the user's message, then the assistant's reply.
    ///
    /// A failed request still completes the exchange: the reply slot gets
    /// [`CHAT_FALLBACK_REPLY`] and the error is only logged. Returns the
    /// assistant message that was appended.
    pub async fn send(
        &self,
        api: &dyn BackendApi,
        token: &str,
        input: &str,
    ) -> Result<ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return Err(MedfolioError::invalid_input("Type a message first"));
        }
        let _guard = self
            .sending
            .try_begin()
            .ok_or_else(|| MedfolioError::Busy("chat".into()))?;

        self.messages.write().await.push(ChatMessage::user(text));

        let reply = match api.chat(token, text).await {
            Ok(reply) => ChatMessage::assistant(reply.reply),
            Err(err) => {
                tracing::warn!(error = %err, "[ChatPane] Chat request failed");
                ChatMessage::assistant(CHAT_FALLBACK_REPLY)
            }
        };
        self.messages.write().await.push(reply.clone());
        Ok(reply)
    }

    /// Empties the transcript. Nothing happens unless `confirmed`.
    pub async fn clear(&self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(MedfolioError::Cancelled);
        }
        self.messages.write().await.clear();
        Ok(())
    }
}

use std::sync::Arc;

use crate::core::config::{ChatMode, InferenceConfig};
use crate::core::errors::ApiError;
use crate::upstream::types::{ChatMessage, CompletionRequest};
use crate::upstream::{InferenceBackend, RagBackend};

use super::prompt::build_augmented_prompt;
use super::transcript::format_messages;

/// Turns a conversation into a single assistant reply.
#[derive(Clone)]
pub struct ChatRelay {
    rag: Arc<dyn RagBackend>,
    inference: Arc<dyn InferenceBackend>,
    mode: ChatMode,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl ChatRelay {
    pub fn new(
        rag: Arc<dyn RagBackend>,
        inference: Arc<dyn InferenceBackend>,
        mode: ChatMode,
        settings: &InferenceConfig,
    ) -> Self {
        Self {
            rag,
            inference,
            mode,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Answers the last message of `messages`, using the earlier ones as
    /// history.
    ///
    /// Fails with `ApiError::BadRequest` when `messages` is empty. Upstream
    /// failures are returned as-is; nothing is retried.
    pub async fn respond(&self, messages: &[ChatMessage]) -> Result<String, ApiError> {
        let (latest, prior) = messages
            .split_last()
            .ok_or_else(|| ApiError::BadRequest("messages must not be empty".to_string()))?;
        let query = latest.content.as_str();
        let history = format_messages(prior);

        let text = match self.mode {
            ChatMode::RagAnswer => self.rag.answer(query, &history).await?,
            ChatMode::Augmented => {
                let context = self.rag.retrieve_context(query).await?;
                tracing::debug!("Retrieved {} bytes of context", context.len());

                let request = CompletionRequest {
                    model: self.model.clone(),
                    prompt: build_augmented_prompt(&context, &history, query),
                    max_tokens: self.max_tokens,
                    temperature: self.temperature,
                };
                self.inference.complete(&request).await?
            }
        };

        Ok(text.trim().to_string())
    }
}

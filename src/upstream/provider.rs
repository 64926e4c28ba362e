use async_trait::async_trait;

use super::types::{CompletionRequest, UploadedFile};
use crate::core::errors::ApiError;

/// The external retrieval service.
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// Returns retrieved context text for `query`.
    async fn retrieve_context(&self, query: &str) -> Result<String, ApiError>;

    /// Returns the service's own answer for `query` given a flat transcript.
    async fn answer(&self, query: &str, chat_history: &str) -> Result<String, ApiError>;

    async fn upload(&self, file: UploadedFile) -> Result<(), ApiError>;
}

/// The external completion service.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Returns the text of the first completion choice, untrimmed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError>;
}

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};

use super::ensure_success;
use super::provider::RagBackend;
use super::types::{RagAnswerResponse, RagChatRequest, RagContextResponse, UploadedFile};
use crate::core::config::RagConfig;
use crate::core::errors::{ApiError, Upstream};

const UPLOAD_FIELD: &str = "file";
const FALLBACK_FILE_NAME: &str = "upload.bin";

#[derive(Clone)]
pub struct HttpRagClient {
    chat_url: String,
    upload_url: String,
    client: Client,
}

impl HttpRagClient {
    pub fn new(config: &RagConfig, client: Client) -> Self {
        Self {
            chat_url: config.chat_url(),
            upload_url: config.upload_url(),
            client,
        }
    }

    async fn post_chat(&self, body: &RagChatRequest) -> Result<reqwest::Response, ApiError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(Upstream::Rag, e))?;
        ensure_success(Upstream::Rag, response).await
    }
}

#[async_trait]
impl RagBackend for HttpRagClient {
    async fn retrieve_context(&self, query: &str) -> Result<String, ApiError> {
        let body = RagChatRequest {
            query: query.to_string(),
            chat_history: None,
        };
        let payload: RagContextResponse = self
            .post_chat(&body)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::from_transport(Upstream::Rag, e))?;
        Ok(payload.context)
    }

    async fn answer(&self, query: &str, chat_history: &str) -> Result<String, ApiError> {
        let body = RagChatRequest {
            query: query.to_string(),
            chat_history: Some(chat_history.to_string()),
        };
        let payload: RagAnswerResponse = self
            .post_chat(&body)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::from_transport(Upstream::Rag, e))?;
        Ok(payload.response)
    }

    async fn upload(&self, file: UploadedFile) -> Result<(), ApiError> {
        let UploadedFile {
            file_name,
            content_type,
            bytes,
        } = file;
        let length = bytes.len() as u64;
        let file_name = file_name.unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        let mut part = Part::stream_with_length(Body::from(bytes), length)
            .file_name(file_name);
        if let Some(content_type) = content_type.as_deref() {
            part = part.mime_str(content_type).map_err(ApiError::internal)?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!("Forwarding {} bytes to {}", length, self.upload_url);
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(Upstream::Rag, e))?;
        ensure_success(Upstream::Rag, response).await?;
        Ok(())
    }
}

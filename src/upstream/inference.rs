use async_trait::async_trait;
use reqwest::Client;

use super::ensure_success;
use super::provider::InferenceBackend;
use super::types::{CompletionRequest, CompletionResponse};
use crate::core::config::InferenceConfig;
use crate::core::errors::{ApiError, Upstream};

#[derive(Clone)]
pub struct HttpInferenceClient {
    completions_url: String,
    client: Client,
}

impl HttpInferenceClient {
    pub fn new(config: &InferenceConfig, client: Client) -> Self {
        Self {
            completions_url: config.completions_url(),
            client,
        }
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.completions_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(Upstream::Inference, e))?;
        let response = ensure_success(Upstream::Inference, response).await?;

        let payload: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::from_transport(Upstream::Inference, e))?;

        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| ApiError::UpstreamPayload {
                service: Upstream::Inference,
                detail: "completion has no choices".to_string(),
            })
    }
}

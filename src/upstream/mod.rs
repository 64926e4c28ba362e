pub mod inference;
pub mod provider;
pub mod rag;
pub mod types;

use std::time::Duration;

use reqwest::{Client, Response};

use crate::core::config::UpstreamConfig;
use crate::core::errors::{ApiError, Upstream};

pub use inference::HttpInferenceClient;
pub use provider::{InferenceBackend, RagBackend};
pub use rag::HttpRagClient;

pub fn build_http_client(config: &UpstreamConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// Passes successful responses through and turns anything else into
/// `ApiError::UpstreamStatus`.
async fn ensure_success(service: Upstream, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} service responded {}: {}", service, status, body);
    Err(ApiError::UpstreamStatus { service, status })
}

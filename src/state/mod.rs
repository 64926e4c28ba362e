use std::sync::Arc;

use crate::core::config::{load_config, RelayConfig};
use crate::relay::ChatRelay;
use crate::upstream::{
    build_http_client, HttpInferenceClient, HttpRagClient, InferenceBackend, RagBackend,
};

pub mod error;

use error::InitializationError;

/// Shared application state handed to every route.
///
/// Everything in here is immutable after startup; handlers never coordinate
/// with each other through it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub chat: ChatRelay,
    pub rag: Arc<dyn RagBackend>,
}

impl AppState {
    /// Loads configuration from the environment and wires the HTTP clients.
    pub fn initialize() -> Result<Arc<Self>, InitializationError> {
        let config = load_config()?;
        Self::from_config(config)
    }

    pub fn from_config(config: RelayConfig) -> Result<Arc<Self>, InitializationError> {
        let client = build_http_client(&config.upstream)
            .map_err(InitializationError::HttpClient)?;
        let rag: Arc<dyn RagBackend> = Arc::new(HttpRagClient::new(&config.rag, client.clone()));
        let inference: Arc<dyn InferenceBackend> =
            Arc::new(HttpInferenceClient::new(&config.inference, client));
        Ok(Self::with_backends(config, rag, inference))
    }

    pub fn with_backends(
        config: RelayConfig,
        rag: Arc<dyn RagBackend>,
        inference: Arc<dyn InferenceBackend>,
    ) -> Arc<Self> {
        let chat = ChatRelay::new(rag.clone(), inference, config.chat.mode, &config.inference);
        Arc::new(AppState {
            config: Arc::new(config),
            chat,
            rag,
        })
    }
}

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use rag_relay::core::logging;
use rag_relay::server;
use rag_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize()?;
    logging::init(&state.config.logging);

    tracing::info!(
        rag_chat = %state.config.rag.chat_url(),
        rag_upload = %state.config.rag.upload_url(),
        inference = %state.config.inference.completions_url(),
        mode = %state.chat.mode(),
        "Relay configured"
    );

    let bind_addr = state.config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

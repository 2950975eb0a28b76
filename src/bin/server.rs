//! Standalone operator functions server.
//!
//! Hosts the two streaming chat functions (operator-chat and
//! operator-diagnostics) plus a status endpoint.
//!
//! Run with: PORT=3001 cargo run --bin operator-server

use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

use airsoft_operator_chat::config::{GatewayConfig, ServerConfig};
use airsoft_operator_chat::handlers::{
    operator_chat_handler, operator_diagnostics_handler, status_handler, ProxyState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Airsoft HQ operator functions server...");

    let server = ServerConfig::from_env();
    let gateway = GatewayConfig::from_env();
    if !gateway.is_configured() {
        tracing::warn!("AI_GATEWAY_API_KEY is not set; upstream requests will be rejected");
    }

    let state = ProxyState::new(gateway);

    let app = Router::new()
        .route("/functions/v1/operator-chat", post(operator_chat_handler))
        .route(
            "/functions/v1/operator-diagnostics",
            post(operator_diagnostics_handler),
        )
        .route("/api/status", get(status_handler))
        .layer(Extension(state))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], server.port));
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

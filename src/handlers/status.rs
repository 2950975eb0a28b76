//! Health/status endpoint for the operator functions server.

use axum::{Extension, Json};
use serde::Serialize;

use super::chat_proxy::ProxyState;

/// GET /api/status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub available: bool,
    pub model: String,
    pub gateway_configured: bool,
}

pub async fn status_handler(Extension(state): Extension<ProxyState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        available: true,
        model: state.gateway.model.clone(),
        gateway_configured: state.gateway.is_configured(),
    })
}

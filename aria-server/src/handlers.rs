use std::net::SocketAddr;

use aria_agent::{validate_message, ReplyOutcome};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Response {
    let message = match validate_message(payload.message.as_deref()) {
        Ok(message) => message,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    };

    let client_id = client_id(peer, &headers, state.trust_forwarded_for);
    let span = tracing::info_span!("chat", request_id = %Uuid::new_v4(), client_id = %client_id);

    let reply = state
        .gateway
        .respond(&client_id, message)
        .instrument(span)
        .await;

    let status = match reply.outcome {
        ReplyOutcome::Completed => StatusCode::OK,
        ReplyOutcome::Fallback(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ChatResponse { reply: reply.text })).into_response()
}

pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "brain": "Active",
        "conversations": state.gateway.store().size(),
        "memory": "Optimized",
        "message": "AI Brain is fully operational",
        "sweeper": state.sweeper.status().await,
    }))
}

/// Resolve the conversation key for a request
///
/// The peer IP, or the first `X-Forwarded-For` hop when the server sits
/// behind a trusted proxy.
pub fn client_id(peer: SocketAddr, headers: &HeaderMap, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(addr) = forwarded {
            return addr.to_string();
        }
    }
    peer.ip().to_string()
}

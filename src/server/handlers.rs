// HTTP request handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AssistantServer;
use crate::chat::ChatMessage;
use crate::pipeline::{RouterError, RouterReply};

/// Reply included in every error envelope, so the portal always has
/// something to render
const APOLOGY_REPLY: &str =
    "I'm sorry, I wasn't able to process that message. Please try again in a moment.";

/// Create the main application router
pub fn create_router(server: Arc<AssistantServer>) -> Router {
    Router::new()
        .route("/v1/chat", post(handle_chat))
        .route("/health", get(health_check))
        .with_state(server)
}

/// Request body for /v1/chat
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    /// The new user message
    pub message: String,
    /// Prior turns, oldest first
    #[serde(rename = "chatHistory", default)]
    pub chat_history: Vec<ChatMessage>,
}

/// Handle POST /v1/chat - route one message through the pipeline
async fn handle_chat(
    State(server): State<Arc<AssistantServer>>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<RouterReply>, ChatFailure> {
    if request.message.trim().is_empty() {
        return Err(ChatFailure::bad_request("message must not be blank"));
    }

    let reply = server
        .router()
        .route(&request.message, &request.chat_history)
        .await?;

    Ok(Json(reply))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Handle GET /health - liveness check
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
    })
}

/// Error envelope for requests the pipeline could not answer
///
/// Carries `{ error, reply }` and no `source` field: callers distinguish
/// failure envelopes from routed replies by the `error` key.
pub struct ChatFailure {
    status: StatusCode,
    error: String,
}

impl ChatFailure {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }
}

impl From<RouterError> for ChatFailure {
    fn from(err: RouterError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ChatFailure {
    fn into_response(self) -> Response {
        tracing::error!(status = %self.status, error = %self.error, "Chat request failed");

        let body = serde_json::json!({
            "error": self.error,
            "reply": APOLOGY_REPLY,
        });

        (self.status, Json(body)).into_response()
    }
}

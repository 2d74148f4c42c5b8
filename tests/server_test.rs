// Integration tests for the HTTP server
//
// Drives the axum router directly with tower's oneshot, no sockets.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use caduceus::chat::ChatMessage;
use caduceus::pipeline::{ConversationalMatcher, EmergencyDetector, MessageRouter};
use caduceus::server::{create_router, AssistantServer, ServerConfig};
use caduceus::upstream::{ChatError, UpstreamChat};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

/// Scripted outcome for the mock upstream
enum MockOutcome {
    Reply(&'static str),
    RateLimited,
    BadShape,
}

struct MockUpstream {
    outcome: MockOutcome,
}

#[async_trait]
impl UpstreamChat for MockUpstream {
    async fn send(&self, _history: &[ChatMessage], _message: &str) -> Result<String, ChatError> {
        match &self.outcome {
            MockOutcome::Reply(text) => Ok(text.to_string()),
            MockOutcome::RateLimited => Err(ChatError::RateLimited("quota exhausted".to_string())),
            MockOutcome::BadShape => Err(ChatError::BadResponse("missing choices".to_string())),
        }
    }
}

fn test_app(outcome: MockOutcome) -> axum::Router {
    let router = MessageRouter::new(
        ConversationalMatcher::with_seed(3),
        EmergencyDetector::new(),
        Arc::new(MockUpstream { outcome }),
    );
    let server = AssistantServer::new(router, ServerConfig::default());
    create_router(Arc::new(server))
}

fn chat_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 65536)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_chat_returns_reply_and_source() {
    let app = test_app(MockOutcome::Reply("unused"));

    let response = app
        .oneshot(chat_request(json!({ "message": "hello", "chatHistory": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(!body["reply"].as_str().unwrap().is_empty());
    assert_eq!(body["source"], "conversational-handler");
    assert!(body.get("errorDetail").is_none());
}

#[tokio::test]
async fn test_chat_history_field_is_optional() {
    let app = test_app(MockOutcome::Reply("unused"));

    let response = app
        .oneshot(chat_request(json!({ "message": "good morning" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_emergency_takes_priority() {
    let app = test_app(MockOutcome::Reply("unused"));

    let response = app
        .oneshot(chat_request(json!({ "message": "I think I'm having a stroke" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["source"], "emergency-detection");
    assert!(body["reply"].as_str().unwrap().contains("911"));
}

#[tokio::test]
async fn test_chat_upstream_reply_flows_through() {
    let app = test_app(MockOutcome::Reply("Aim for 7 to 9 hours of sleep."));

    let response = app
        .oneshot(chat_request(
            json!({ "message": "how much sleep do adults need", "chatHistory": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["source"], "openai");
    assert_eq!(body["reply"], "Aim for 7 to 9 hours of sleep.");
}

#[tokio::test]
async fn test_chat_absorbs_rate_limit_as_200() {
    let app = test_app(MockOutcome::RateLimited);

    let response = app
        .oneshot(chat_request(
            json!({ "message": "what is a healthy breakfast", "chatHistory": [] }),
        ))
        .await
        .unwrap();

    // The upstream 429 must never surface to the portal
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["source"], "fallback");
    assert!(!body["reply"].as_str().unwrap().is_empty());
    assert!(body["errorDetail"].as_str().unwrap().contains("quota"));
}

#[tokio::test]
async fn test_chat_blank_message_is_rejected() {
    let app = test_app(MockOutcome::Reply("unused"));

    let response = app
        .oneshot(chat_request(json!({ "message": "   ", "chatHistory": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "message must not be blank");
    assert!(!body["reply"].as_str().unwrap().is_empty());
    assert!(body.get("source").is_none());
}

#[tokio::test]
async fn test_chat_malformed_upstream_returns_500() {
    let app = test_app(MockOutcome::BadShape);

    let response = app
        .oneshot(chat_request(
            json!({ "message": "tell me about flu shots", "chatHistory": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("unusable"));
    assert!(!body["reply"].as_str().unwrap().is_empty());
    assert!(body.get("source").is_none());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(MockOutcome::Reply("unused"));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
}

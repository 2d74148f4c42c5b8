// Upstream chat-completion support
//
// This module provides the trait seam between the routing pipeline and the
// hosted model API, so the pipeline can be exercised with mock upstreams.

use async_trait::async_trait;
use thiserror::Error;

use crate::chat::ChatMessage;

mod client;

pub use client::OpenAiClient;

/// Failures from one upstream attempt
///
/// The router absorbs every variant except `BadResponse`: a request that
/// reached the API and came back unusable is surfaced to the caller, while
/// credential, quota, and transport problems turn into scripted replies.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no upstream API key configured")]
    MissingCredentials,
    #[error("upstream rate limit or quota exhausted: {0}")]
    RateLimited(String),
    #[error("upstream returned status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed upstream response: {0}")]
    BadResponse(String),
}

/// Trait for upstream chat backends
///
/// One call = one attempt. Retries are deliberately not part of the
/// contract; the pipeline answers from its fallback tables instead.
#[async_trait]
pub trait UpstreamChat: Send + Sync {
    /// Send the conversation and return the assistant's reply text
    async fn send(&self, history: &[ChatMessage], message: &str) -> Result<String, ChatError>;
}

// HTTP client for the hosted chat-completions API

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatError, UpstreamChat};
use crate::chat::{assemble_conversation, ChatMessage};
use crate::config::Config;

pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl UpstreamChat for OpenAiClient {
    /// Send the conversation upstream and extract the assistant reply
    ///
    /// The credential check happens before anything touches the network, so
    /// an unconfigured deployment costs nothing per request. A blank key
    /// counts as no key.
    async fn send(&self, history: &[ChatMessage], message: &str) -> Result<String, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ChatError::MissingCredentials)?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: assemble_conversation(history, message),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(self.chat_completions_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 429 || is_quota_exhausted(&body) {
                return Err(ChatError::RateLimited(body));
            }
            return Err(ChatError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_reply(&body)
    }
}

/// Quota-exhaustion errors arrive with various statuses, so the body is
/// checked in addition to the 429 status code
fn is_quota_exhausted(body: &str) -> bool {
    let normalized = body.to_lowercase();
    normalized.contains("insufficient_quota") || normalized.contains("exceeded your current quota")
}

/// Extract the assistant reply text from a 2xx response body
fn parse_reply(body: &str) -> Result<String, ChatError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::BadResponse(format!("failed to parse response: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::BadResponse("response contained no choices".to_string()))?;

    match choice.message.content {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(ChatError::BadResponse(
            "response contained no message content".to_string(),
        )),
    }
}

// Chat-completions wire types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

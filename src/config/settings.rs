// Configuration structs

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key, absent when running without upstream access
    pub api_key: Option<String>,

    /// Chat completion model
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Upstream request timeout in seconds
    pub request_timeout_secs: u64,

    /// Sampling temperature for upstream completions
    pub temperature: f32,

    /// Completion length cap, in tokens
    pub max_tokens: u32,

    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Optional override file for the emergency keyword lists
    pub emergency_keywords_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 30,
            temperature: 0.7,
            max_tokens: 500,
            bind_address: "127.0.0.1:8080".to_string(),
            emergency_keywords_path: None,
        }
    }
}

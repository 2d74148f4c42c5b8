// Configuration loader
// Loads settings from ~/.caduceus/config.toml or environment variables

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::settings::Config;

/// Load configuration from the caduceus config file or environment
///
/// A missing file is not an error, and neither is a missing API key: the
/// router answers from its local tables when no upstream credential is
/// configured.
pub fn load_config() -> Result<Config> {
    let mut config = match try_load_from_caduceus_config()? {
        Some(config) => config,
        None => Config::default(),
    };

    // Environment variable fills in a key the file did not set
    if config.api_key.is_none() {
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            if !api_key.trim().is_empty() {
                config.api_key = Some(api_key);
            }
        }
    }

    if config.api_key.is_none() {
        tracing::warn!("No OpenAI API key configured; replies will come from local tables");
    }

    Ok(config)
}

fn try_load_from_caduceus_config() -> Result<Option<Config>> {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return Ok(None),
    };
    let config_path = home.join(".caduceus/config.toml");

    if !config_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    parse_config(&contents).map(Some)
}

/// Parse TOML contents into a Config, defaulting every omitted field
fn parse_config(contents: &str) -> Result<Config> {
    #[derive(serde::Deserialize)]
    struct TomlConfig {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        request_timeout_secs: Option<u64>,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default)]
        bind_address: Option<String>,
        #[serde(default)]
        emergency_keywords_path: Option<PathBuf>,
    }

    let toml_config: TomlConfig =
        toml::from_str(contents).context("Failed to parse config.toml")?;

    let defaults = Config::default();
    Ok(Config {
        // A blank key in the file means unconfigured, same as no key
        api_key: toml_config.api_key.filter(|key| !key.trim().is_empty()),
        model: toml_config.model.unwrap_or(defaults.model),
        base_url: toml_config.base_url.unwrap_or(defaults.base_url),
        request_timeout_secs: toml_config
            .request_timeout_secs
            .unwrap_or(defaults.request_timeout_secs),
        temperature: toml_config.temperature.unwrap_or(defaults.temperature),
        max_tokens: toml_config.max_tokens.unwrap_or(defaults.max_tokens),
        bind_address: toml_config.bind_address.unwrap_or(defaults.bind_address),
        emergency_keywords_path: toml_config.emergency_keywords_path,
    })
}

//! Summarization service configuration read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::llm::CompletionOptions;

pub const DEFAULT_API_URL: &str = "https://api.hyperbolic.xyz/v1/chat/completions";

pub const API_KEY_ENV_VAR: &str = "AUTOSCRIBE_API_KEY";
/// Accepted when `AUTOSCRIBE_API_KEY` is not set.
pub const FALLBACK_API_KEY_ENV_VAR: &str = "HYPERBOLIC_API_KEY";
pub const API_URL_ENV_VAR: &str = "AUTOSCRIBE_API_URL";
pub const MODEL_ENV_VAR: &str = "AUTOSCRIBE_MODEL";
pub const MAX_TOKENS_ENV_VAR: &str = "AUTOSCRIBE_MAX_TOKENS";
pub const TEMPERATURE_ENV_VAR: &str = "AUTOSCRIBE_TEMPERATURE";
pub const TOP_P_ENV_VAR: &str = "AUTOSCRIBE_TOP_P";
/// Per-request timeout in seconds. Unset means requests never time out.
pub const TIMEOUT_ENV_VAR: &str = "AUTOSCRIBE_API_TIMEOUT";

/// Everything needed to talk to the text-generation endpoint.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_url: String,
    pub api_key: String,
    pub options: CompletionOptions,
    pub timeout: Option<Duration>,
}

impl SummarizerConfig {
    /// Load configuration from `AUTOSCRIBE_*` environment variables.
    ///
    /// The API key is required. Numeric settings that fail to parse are
    /// logged and replaced by their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = non_empty_var(API_KEY_ENV_VAR)
            .or_else(|| non_empty_var(FALLBACK_API_KEY_ENV_VAR))
            .ok_or(ConfigError::MissingApiKey)?;

        let defaults = CompletionOptions::default();
        let options = CompletionOptions {
            model: non_empty_var(MODEL_ENV_VAR).unwrap_or(defaults.model),
            max_tokens: parsed_var(MAX_TOKENS_ENV_VAR, defaults.max_tokens),
            temperature: parsed_var(TEMPERATURE_ENV_VAR, defaults.temperature),
            top_p: parsed_var(TOP_P_ENV_VAR, defaults.top_p),
        };

        let timeout = non_empty_var(TIMEOUT_ENV_VAR).and_then(|v| match v.parse::<u64>() {
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                warn!("Invalid {} value '{}', requests will not time out", TIMEOUT_ENV_VAR, v);
                None
            }
        });

        Ok(Self {
            api_url: non_empty_var(API_URL_ENV_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            options,
            timeout,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match non_empty_var(name) {
        Some(v) => match v.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {} value '{}', using default {}", name, v, default);
                default
            }
        },
        None => default,
    }
}

//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// AI provider configuration
///
/// Any OpenAI-compatible chat completions endpoint works; the defaults point
/// at Gemini's compatibility endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the endpoint
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name, also recorded with each optimization
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for opening a response stream, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after a failed attempt to open a stream
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// First retry delay in milliseconds; doubles per retry
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    /// Overall deadline for one generation, in seconds
    #[serde(default = "default_stream_deadline")]
    pub stream_deadline_secs: u64,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Completion token cap
    pub max_tokens: Option<u32>,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn stream_deadline(&self) -> Duration {
        Duration::from_secs(self.stream_deadline_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::Missing("ai.api_key"));
        }

        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::BadUrl {
                field: "ai.base_url",
                scheme: "http(s)",
            });
        }

        if self.model.trim().is_empty() {
            return Err(ValidationError::Missing("ai.model"));
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::out_of_range("ai.timeout_secs", "greater than zero"));
        }

        if self.stream_deadline_secs < self.timeout_secs {
            return Err(ValidationError::out_of_range(
                "ai.stream_deadline_secs",
                "at least ai.timeout_secs",
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ValidationError::out_of_range("ai.temperature", "between 0.0 and 2.0"));
            }
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
            stream_deadline_secs: default_stream_deadline(),
            temperature: None,
            max_tokens: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    2
}

fn default_retry_base_delay() -> u64 {
    500
}

fn default_stream_deadline() -> u64 {
    180
}

//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PROMPTWISE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use promptwise::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod database;
mod dialogue;
mod error;
mod server;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use dialogue::{CatalogConfig, DeliveryConfig, SessionConfig};
pub use error::{ConfigError, ValidationError};
pub use server::{LogConfig, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Listener, request timeout and logging
    #[serde(default)]
    pub server: ServerConfig,

    /// Generation endpoint configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Optional PostgreSQL prompt log
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Mode catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Chat message size limits
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Idle conversation eviction
    #[serde(default)]
    pub sessions: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PROMPTWISE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PROMPTWISE__SERVER__BIND=0.0.0.0:8080` -> `server.bind`
    /// - `PROMPTWISE__SERVER__LOG__FORMAT=json` -> `server.log.format`
    /// - `PROMPTWISE__AI__API_KEY=...` -> `ai.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PROMPTWISE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.database.validate()?;
        self.delivery.validate()?;
        self.sessions.validate()?;

        // A chat turn includes a whole generation
        if self.server.request_timeout_secs < self.ai.stream_deadline_secs {
            return Err(ValidationError::out_of_range(
                "server.request_timeout_secs",
                "at least ai.stream_deadline_secs",
            ));
        }

        Ok(())
    }
}

//! Mode catalog, delivery and session configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::delivery::{DeliveryPolicy, DEFAULT_ATTACHMENT_FILENAME, INLINE_LIMIT, MAX_CHUNKS};
use crate::domain::optimizer::{CatalogError, ModeCatalog};

/// Where the mode catalog comes from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// YAML file of `mode: instruction` pairs; the built-in catalog when unset
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    /// Loads the catalog once, at startup.
    pub fn load(&self) -> Result<ModeCatalog, CatalogError> {
        match &self.path {
            Some(path) => ModeCatalog::from_yaml_file(path),
            None => Ok(ModeCatalog::builtin()),
        }
    }
}

/// Message size limits of the chat platform
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Maximum characters per message
    #[serde(default = "default_inline_limit")]
    pub inline_limit: usize,

    /// Maximum messages for a chunked delivery
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Filename for attached results
    #[serde(default = "default_attachment_filename")]
    pub attachment_filename: String,
}

impl DeliveryConfig {
    pub fn policy(&self) -> Result<DeliveryPolicy, ValidationError> {
        DeliveryPolicy::new(
            self.inline_limit,
            self.max_chunks,
            self.attachment_filename.clone(),
        )
        .map_err(ValidationError::from)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.policy().map(|_| ())
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            inline_limit: default_inline_limit(),
            max_chunks: default_max_chunks(),
            attachment_filename: default_attachment_filename(),
        }
    }
}

fn default_inline_limit() -> usize {
    INLINE_LIMIT
}

fn default_max_chunks() -> usize {
    MAX_CHUNKS
}

fn default_attachment_filename() -> String {
    DEFAULT_ATTACHMENT_FILENAME.to_string()
}

/// Lifetime of conversations the user walked away from
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds without a turn before a conversation is dropped
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idle_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "sessions.idle_timeout_secs",
                "greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    1800
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_catalog_defaults_to_builtin() {
        let catalog = CatalogConfig::default().load().unwrap();
        assert_eq!(catalog.len(), ModeCatalog::builtin().len());
    }

    #[test]
    fn test_catalog_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "haiku: Rewrite the prompt as a haiku request.").unwrap();

        let config = CatalogConfig {
            path: Some(file.path().to_path_buf()),
        };
        let catalog = config.load().unwrap();

        assert!(catalog.lookup("haiku").is_some());
        assert!(catalog.lookup("clarity").is_none());
    }

    #[test]
    fn test_catalog_missing_file_is_error() {
        let config = CatalogConfig {
            path: Some(PathBuf::from("/nonexistent/modes.yaml")),
        };
        assert!(config.load().is_err());
    }

    #[test]
    fn test_delivery_defaults_match_platform_limits() {
        let policy = DeliveryConfig::default().policy().unwrap();
        assert_eq!(policy.inline_limit(), 4000);
        assert_eq!(policy.chunked_limit(), 20000);
        assert_eq!(policy.attachment_filename(), "response.txt");
    }

    #[test]
    fn test_delivery_rejects_zero_limit() {
        let config = DeliveryConfig {
            inline_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Delivery(_))
        ));
    }

    #[test]
    fn test_sessions_default_to_half_an_hour() {
        let config = SessionConfig::default();
        assert_eq!(config.idle_timeout(), Duration::from_secs(1800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sessions_reject_zero_idle_timeout() {
        let config = SessionConfig {
            idle_timeout_secs: 0,
        };
        assert!(config.validate().is_err());
    }
}

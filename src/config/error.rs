//! Configuration errors

use thiserror::Error;

/// The environment could not be read into [`super::AppConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// A setting the service cannot run with
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{field} must be {expected}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} must be a {scheme} URL")]
    BadUrl {
        field: &'static str,
        scheme: &'static str,
    },

    #[error("Invalid delivery limits: {0}")]
    Delivery(#[from] crate::domain::foundation::ValidationError),
}

impl ValidationError {
    pub(crate) fn out_of_range(field: &'static str, expected: &'static str) -> Self {
        ValidationError::OutOfRange { field, expected }
    }
}

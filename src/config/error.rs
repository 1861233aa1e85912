//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddress(String),

    #[error("Invalid timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Default currency {0} is not in the supported list")]
    DefaultCurrencyNotSupported(String),

    #[error("Invalid country code: {0}")]
    InvalidCountry(String),

    #[error("Google Pay environment must be TEST or PRODUCTION")]
    InvalidGooglePayEnvironment,
}

/// Splits a comma-separated setting, dropping blanks.
pub(crate) fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses an optional URL setting; blank counts as absent.
pub(crate) fn parse_url(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<url::Url>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => url::Url::parse(value)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidUrl {
                field,
                value: value.to_string(),
            }),
    }
}

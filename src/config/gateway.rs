//! Payment gateway configuration (NMI)

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use super::error::{parse_url, ValidationError};
use crate::adapters::gateway::{NmiConfig, DEFAULT_TRANSACT_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Direct-post security key. Absent keys are allowed; submissions then
    /// fail with a configuration error.
    pub security_key: Option<SecretString>,

    #[serde(default = "default_transact_url")]
    pub transact_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            security_key: None,
            transact_url: default_transact_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl GatewayConfig {
    pub fn nmi(&self) -> NmiConfig {
        NmiConfig::from_secret(self.security_key.clone())
            .with_transact_url(self.transact_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        parse_url("gateway.transact_url", Some(&self.transact_url))?.ok_or(
            ValidationError::InvalidUrl {
                field: "gateway.transact_url",
                value: String::new(),
            },
        )?;
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("gateway.timeout_secs"));
        }
        Ok(())
    }
}

fn default_transact_url() -> String {
    DEFAULT_TRANSACT_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_nmi() {
        let config = GatewayConfig::default();
        assert_eq!(config.transact_url, DEFAULT_TRANSACT_URL);
        assert!(config.validate().is_ok());
        assert!(!config.nmi().is_configured());
    }

    #[test]
    fn key_configures_gateway() {
        let config = GatewayConfig {
            security_key: Some(SecretString::new("key".to_string())),
            ..Default::default()
        };
        assert!(config.nmi().is_configured());
    }

    #[test]
    fn rejects_bad_url_and_timeout() {
        let config = GatewayConfig {
            transact_url: "ftp://gateway".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidUrl { .. })));

        let config = GatewayConfig {
            transact_url: "   ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GatewayConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("gateway.timeout_secs"))
        );
    }
}

//! Outbound webhook configuration

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use super::error::{parse_url, split_list, ValidationError};
use crate::application::{SIGNATURE_HEADER, SIGNATURE_HEADER_ALIAS};
use crate::domain::signing::SignatureCodec;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhooksConfig {
    /// Subscriber URLs, comma-separated.
    pub urls: Option<String>,

    /// HMAC secret. Without it events are sent unsigned.
    pub secret: Option<SecretString>,

    /// Header names carrying the signature, comma-separated.
    pub signature_headers: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebhooksConfig {
    fn default() -> Self {
        Self {
            urls: None,
            secret: None,
            signature_headers: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl WebhooksConfig {
    pub fn subscriber_urls(&self) -> Vec<String> {
        split_list(self.urls.as_deref())
    }

    pub fn signature_header_names(&self) -> Vec<String> {
        let names = split_list(self.signature_headers.as_deref());
        if names.is_empty() {
            vec![
                SIGNATURE_HEADER.to_string(),
                SIGNATURE_HEADER_ALIAS.to_string(),
            ]
        } else {
            names
        }
    }

    pub fn codec(&self) -> SignatureCodec {
        SignatureCodec::from_secret(self.secret.as_ref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for url in self.subscriber_urls() {
            parse_url("webhooks.urls", Some(&url))?;
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout("webhooks.timeout_secs"));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_subscriber_list() {
        let config = WebhooksConfig {
            urls: Some(" https://a.example.com/hook, ,https://b.example.com/hook ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.subscriber_urls(),
            vec!["https://a.example.com/hook", "https://b.example.com/hook"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_signature_headers() {
        let names = WebhooksConfig::default().signature_header_names();
        assert_eq!(names, vec!["x-edge-signature", "X-EdgePlus-Signature"]);
    }

    #[test]
    fn custom_signature_headers() {
        let config = WebhooksConfig {
            signature_headers: Some("x-signature".to_string()),
            ..Default::default()
        };
        assert_eq!(config.signature_header_names(), vec!["x-signature"]);
    }

    #[test]
    fn invalid_subscriber_url() {
        let config = WebhooksConfig {
            urls: Some("not-a-url".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidUrl { .. })));
    }

    #[test]
    fn secret_configures_codec() {
        assert!(!WebhooksConfig::default().codec().is_configured());
        let config = WebhooksConfig {
            secret: Some(SecretString::new("whsec".to_string())),
            ..Default::default()
        };
        assert!(config.codec().is_configured());
    }
}

//! Apple Pay / Google Pay configuration

use std::path::PathBuf;

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::WalletSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct WalletsConfig {
    /// Turns the wallet payment mode on or off.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub apple_pay_merchant_id: Option<String>,

    #[serde(default = "default_display_name")]
    pub apple_pay_display_name: String,

    pub google_pay_merchant_id: Option<String>,

    #[serde(default = "default_google_environment")]
    pub google_pay_environment: String,

    /// Apple Pay merchant domain association file served under `/.well-known`.
    #[serde(default = "default_domain_association_path")]
    pub apple_pay_domain_association_path: PathBuf,
}

impl Default for WalletsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            apple_pay_merchant_id: None,
            apple_pay_display_name: default_display_name(),
            google_pay_merchant_id: None,
            google_pay_environment: default_google_environment(),
            apple_pay_domain_association_path: default_domain_association_path(),
        }
    }
}

impl WalletsConfig {
    pub fn settings(&self, country_code: &str, currency_code: &str) -> WalletSettings {
        WalletSettings {
            apple_pay_merchant_id: self.apple_pay_merchant_id.clone(),
            apple_pay_display_name: self.apple_pay_display_name.clone(),
            google_pay_merchant_id: self.google_pay_merchant_id.clone(),
            google_pay_environment: self.google_pay_environment.clone(),
            country_code: country_code.to_string(),
            currency_code: currency_code.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.google_pay_environment.trim().to_uppercase().as_str() {
            "TEST" | "PRODUCTION" => Ok(()),
            _ => Err(ValidationError::InvalidGooglePayEnvironment),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_display_name() -> String {
    "Imprints".to_string()
}

fn default_google_environment() -> String {
    "PRODUCTION".to_string()
}

fn default_domain_association_path() -> PathBuf {
    PathBuf::from("public/.well-known/apple-developer-merchantid-domain-association")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WalletsConfig::default();
        assert!(config.enabled);
        assert!(config.validate().is_ok());
        let settings = config.settings("GB", "GBP");
        assert_eq!(settings.apple_pay_display_name, "Imprints");
        assert_eq!(settings.currency_code, "GBP");
    }

    #[test]
    fn google_environment_is_checked() {
        let config = WalletsConfig {
            google_pay_environment: "sandbox".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidGooglePayEnvironment)
        );

        let config = WalletsConfig {
            google_pay_environment: "test".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

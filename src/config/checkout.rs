//! Checkout policy configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::{split_list, ValidationError};
use crate::domain::checkout::{AmountCurrencyValidator, CheckoutPolicy};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Accepted ISO 4217 codes, comma-separated.
    #[serde(default = "default_currency")]
    pub currencies: String,

    /// Used when the deep link carries no currency.
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Used when the payer leaves country blank.
    #[serde(default = "default_country")]
    pub default_country: String,

    #[serde(default)]
    pub require_order_reference: bool,

    /// Stamped on webhook events as `channel`.
    pub channel: Option<String>,

    /// Idle sessions older than this are dropped from the registry.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currencies: default_currency(),
            default_currency: default_currency(),
            default_country: default_country(),
            require_order_reference: false,
            channel: None,
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl CheckoutConfig {
    pub fn currency_list(&self) -> Vec<String> {
        split_list(Some(&self.currencies))
    }

    pub fn channel(&self) -> Option<String> {
        self.channel
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn policy(&self, wallets_enabled: bool) -> CheckoutPolicy {
        CheckoutPolicy {
            validator: AmountCurrencyValidator::new(self.currency_list()),
            require_order_reference: self.require_order_reference,
            default_currency: self.default_currency.clone(),
            default_country: self.default_country.clone(),
            wallets_enabled,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let currencies = self.currency_list();
        if currencies.is_empty() {
            return Err(ValidationError::InvalidCurrency(String::new()));
        }
        if let Some(bad) = currencies.iter().find(|c| !is_code(c, 3)) {
            return Err(ValidationError::InvalidCurrency(bad.clone()));
        }
        if !currencies.contains(&self.default_currency) {
            return Err(ValidationError::DefaultCurrencyNotSupported(
                self.default_currency.clone(),
            ));
        }
        if !is_code(&self.default_country, 2) {
            return Err(ValidationError::InvalidCountry(self.default_country.clone()));
        }
        if self.session_ttl_secs == 0 {
            return Err(ValidationError::InvalidTimeout("checkout.session_ttl_secs"));
        }
        Ok(())
    }
}

fn is_code(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_uppercase())
}

fn default_currency() -> String {
    "GBP".to_string()
}

fn default_country() -> String {
    "GB".to_string()
}

fn default_session_ttl() -> u64 {
    1800
}

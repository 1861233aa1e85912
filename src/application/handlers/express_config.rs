//! GetExpressConfigHandler - wallet button configuration for the checkout page.

use serde::Serialize;

use crate::domain::checkout::normalize_amount;

/// Wallet merchant settings. A wallet without a merchant id is not offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSettings {
    pub apple_pay_merchant_id: Option<String>,
    pub apple_pay_display_name: String,
    pub google_pay_merchant_id: Option<String>,
    /// `TEST` selects the Google Pay test environment; anything else is production.
    pub google_pay_environment: String,
    pub country_code: String,
    pub currency_code: String,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            apple_pay_merchant_id: None,
            apple_pay_display_name: "Imprints".to_string(),
            google_pay_merchant_id: None,
            google_pay_environment: "PRODUCTION".to_string(),
            country_code: "GB".to_string(),
            currency_code: "GBP".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayConfig {
    pub merchant_id: String,
    pub display_name: String,
    pub country_code: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePayConfig {
    pub merchant_id: String,
    pub environment: &'static str,
    pub country_code: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressConfig {
    pub amount: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple_pay: Option<ApplePayConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_pay: Option<GooglePayConfig>,
}

pub struct GetExpressConfigHandler {
    settings: WalletSettings,
}

impl GetExpressConfigHandler {
    pub fn new(settings: WalletSettings) -> Self {
        Self { settings }
    }

    /// Builds the widget configuration for `amount`. Unparseable amounts render as `0.00`.
    pub fn handle(&self, amount: &str) -> ExpressConfig {
        let s = &self.settings;
        let merchant = |id: &Option<String>| id.as_deref().filter(|m| !m.trim().is_empty()).map(str::to_string);

        ExpressConfig {
            amount: normalize_amount(amount),
            currency: s.currency_code.clone(),
            apple_pay: merchant(&s.apple_pay_merchant_id).map(|merchant_id| ApplePayConfig {
                merchant_id,
                display_name: s.apple_pay_display_name.clone(),
                country_code: s.country_code.clone(),
                currency_code: s.currency_code.clone(),
            }),
            google_pay: merchant(&s.google_pay_merchant_id).map(|merchant_id| GooglePayConfig {
                merchant_id,
                environment: if s.google_pay_environment.trim().eq_ignore_ascii_case("TEST") {
                    "TEST"
                } else {
                    "PRODUCTION"
                },
                country_code: s.country_code.clone(),
                currency_code: s.currency_code.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_merchants_means_no_wallets() {
        let config = GetExpressConfigHandler::new(WalletSettings::default()).handle("12.5");

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({ "amount": "12.50", "currency": "GBP" })
        );
    }

    #[test]
    fn configured_wallets_are_offered() {
        let handler = GetExpressConfigHandler::new(WalletSettings {
            apple_pay_merchant_id: Some("merchant.com.example".to_string()),
            google_pay_merchant_id: Some("BCR2DN4T".to_string()),
            google_pay_environment: "test".to_string(),
            ..Default::default()
        });

        let config = handler.handle("5");

        let apple = config.apple_pay.unwrap();
        assert_eq!(apple.merchant_id, "merchant.com.example");
        assert_eq!(apple.display_name, "Imprints");
        let google = config.google_pay.unwrap();
        assert_eq!(google.environment, "TEST");
        assert_eq!(google.country_code, "GB");
    }

    #[test]
    fn garbage_amount_renders_zero() {
        let config = GetExpressConfigHandler::new(WalletSettings::default()).handle("abc");
        assert_eq!(config.amount, "0.00");
    }
}

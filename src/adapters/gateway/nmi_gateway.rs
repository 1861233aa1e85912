//! NMI gateway adapter.
//!
//! Posts a `sale` transaction as `application/x-www-form-urlencoded` to the
//! transact endpoint and reads the urlencoded reply. `response=1` is an
//! approval; anything else is a decline described by `responsetext`.
//!
//! # Security
//!
//! - The security key is held as `secrecy::SecretString` and never logged
//! - Only the payment token is sent; card data never reaches this service

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::checkout::{format_amount, PaymentOutcome};
use crate::ports::{ChargeRequest, GatewayError, PaymentGateway};

pub const DEFAULT_TRANSACT_URL: &str = "https://edge-plus.transactiongateway.com/api/transact.php";

const APPROVED_RESPONSE: &str = "1";
const DEFAULT_DECLINE_REASON: &str = "Gateway declined the payment";

/// NMI connection settings.
#[derive(Clone)]
pub struct NmiConfig {
    security_key: Option<SecretString>,
    transact_url: String,
    timeout: Duration,
}

impl NmiConfig {
    /// An empty key leaves the gateway unconfigured.
    pub fn new(security_key: impl Into<String>) -> Self {
        let key = security_key.into();
        Self {
            security_key: (!key.is_empty()).then(|| SecretString::new(key)),
            transact_url: DEFAULT_TRANSACT_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_secret(security_key: Option<SecretString>) -> Self {
        Self {
            security_key: security_key.filter(|k| !k.expose_secret().is_empty()),
            transact_url: DEFAULT_TRANSACT_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_transact_url(mut self, url: impl Into<String>) -> Self {
        self.transact_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.security_key.is_some()
    }
}

impl std::fmt::Debug for NmiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NmiConfig")
            .field("security_key", &self.security_key.as_ref().map(|_| "[REDACTED]"))
            .field("transact_url", &self.transact_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Gateway adapter speaking the NMI direct-post protocol.
pub struct NmiGateway {
    config: NmiConfig,
    client: Client,
}

impl NmiGateway {
    pub fn new(config: NmiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

/// Builds the transaction form. Empty optional values are left out.
pub(crate) fn form_fields(
    security_key: &str,
    request: &ChargeRequest,
) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("security_key", security_key.to_string()),
        ("type", "sale".to_string()),
        ("amount", format_amount(request.amount.unwrap_or_default())),
    ];

    let three_ds = &request.three_ds;
    let optional: [(&'static str, Option<&str>); 17] = [
        ("currency", Some(request.currency.as_str())),
        ("payment_token", Some(request.payment_token.as_str())),
        ("orderid", request.order_reference()),
        ("first_name", Some(request.first_name.as_str())),
        ("last_name", Some(request.last_name.as_str())),
        ("email", Some(request.email.as_str())),
        ("address1", Some(request.address1.as_str())),
        ("address2", Some(request.address2.as_str())),
        ("city", Some(request.city.as_str())),
        ("postalcode", Some(request.postcode.as_str())),
        ("country", Some(request.country.as_str())),
        ("cardholder_authentication_value", three_ds.card_holder_auth.as_deref()),
        ("cavv", three_ds.cavv.as_deref()),
        ("eci", three_ds.eci.as_deref()),
        ("xid", three_ds.xid.as_deref()),
        ("three_ds_version", three_ds.three_ds_version.as_deref()),
        ("directory_server_id", three_ds.directory_server_id.as_deref()),
    ];

    fields.extend(optional.into_iter().filter_map(|(name, value)| {
        value
            .filter(|v| !v.is_empty())
            .map(|v| (name, v.to_string()))
    }));
    fields
}

/// Reads the urlencoded reply into an outcome.
///
/// # Errors
///
/// `InvalidResponse` when the body carries no `response` field.
pub(crate) fn parse_response(body: &str) -> Result<PaymentOutcome, GatewayError> {
    let raw: BTreeMap<String, String> = url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect();

    let code = raw
        .get("response")
        .ok_or_else(|| GatewayError::InvalidResponse("missing response code".to_string()))?;

    let transaction_id = raw.get("transactionid").filter(|t| !t.is_empty()).cloned();

    let outcome = if code == APPROVED_RESPONSE {
        PaymentOutcome {
            approved: true,
            transaction_id,
            decline_reason: None,
            raw_gateway_fields: BTreeMap::new(),
        }
    } else {
        let reason = raw
            .get("responsetext")
            .filter(|r| !r.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_DECLINE_REASON.to_string());
        let mut declined = PaymentOutcome::declined(reason);
        declined.transaction_id = transaction_id;
        declined
    };

    Ok(outcome.with_raw_fields(raw))
}

#[async_trait]
impl PaymentGateway for NmiGateway {
    async fn submit(&self, request: &ChargeRequest) -> Result<PaymentOutcome, GatewayError> {
        let key = self
            .config
            .security_key
            .as_ref()
            .ok_or_else(|| GatewayError::NotConfigured("NMI security key missing".to_string()))?;

        let form = form_fields(key.expose_secret(), request);

        let response = self
            .client
            .post(&self.config.transact_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::transport(format!(
                        "timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    GatewayError::transport(format!("connection failed: {}", e))
                } else {
                    GatewayError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "NMI transact request failed");
            return Err(GatewayError::transport(format!("gateway returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let outcome = parse_response(&body)?;
        tracing::info!(
            approved = outcome.approved,
            transaction_id = outcome.transaction_id.as_deref().unwrap_or(""),
            order_reference = request.order_reference().unwrap_or(""),
            "NMI transaction completed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::ThreeDsEvidence;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn request() -> ChargeRequest {
        ChargeRequest {
            payment_token: "tok_1".to_string(),
            amount: Some(Decimal::from_str("10.5").unwrap()),
            currency: "GBP".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            postcode: "N1".to_string(),
            order_reference: Some("ORD-1".to_string()),
            three_ds: ThreeDsEvidence {
                cavv: Some("CAVV1".to_string()),
                eci: Some("05".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn field<'a>(fields: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn form_carries_sale_fields() {
        let fields = form_fields("key_123", &request());

        assert_eq!(field(&fields, "security_key"), Some("key_123"));
        assert_eq!(field(&fields, "type"), Some("sale"));
        assert_eq!(field(&fields, "amount"), Some("10.50"));
        assert_eq!(field(&fields, "payment_token"), Some("tok_1"));
        assert_eq!(field(&fields, "orderid"), Some("ORD-1"));
        assert_eq!(field(&fields, "postalcode"), Some("N1"));
        assert_eq!(field(&fields, "cavv"), Some("CAVV1"));
        assert_eq!(field(&fields, "eci"), Some("05"));
    }

    #[test]
    fn form_omits_empty_values() {
        let fields = form_fields("key", &request());
        assert_eq!(field(&fields, "address1"), None);
        assert_eq!(field(&fields, "xid"), None);
        assert_eq!(field(&fields, "cardholder_authentication_value"), None);
    }

    #[test]
    fn approved_response_parses() {
        let outcome =
            parse_response("response=1&responsetext=SUCCESS&authcode=123456&transactionid=TX1\n")
                .unwrap();

        assert!(outcome.approved);
        assert_eq!(outcome.transaction_id.as_deref(), Some("TX1"));
        assert_eq!(outcome.decline_reason, None);
        assert_eq!(
            outcome.raw_gateway_fields.get("authcode").map(String::as_str),
            Some("123456")
        );
    }

    #[test]
    fn declined_response_keeps_reason() {
        let outcome =
            parse_response("response=2&responsetext=DECLINE&transactionid=TX2").unwrap();

        assert!(!outcome.approved);
        assert_eq!(outcome.decline_reason.as_deref(), Some("DECLINE"));
        assert_eq!(outcome.reason_code().as_deref(), Some("DECLINE"));
    }

    #[test]
    fn decline_without_text_gets_default_reason() {
        let outcome = parse_response("response=3").unwrap();
        assert_eq!(outcome.decline_reason.as_deref(), Some(DEFAULT_DECLINE_REASON));
    }

    #[test]
    fn body_without_response_code_is_invalid() {
        assert!(matches!(
            parse_response("<html>oops</html>"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let gateway = NmiGateway::new(NmiConfig::new(""));
        assert!(!gateway.is_configured());

        let err = gateway.submit(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured(_)));
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", NmiConfig::new("super_secret"));
        assert!(!rendered.contains("super_secret"));
        assert!(rendered.contains("REDACTED"));
    }
}

//! Outbound payment notifications.
//!
//! A [`WebhookEvent`] is built once per terminal outcome and is immutable
//! afterwards. Every subscriber receives the same serialized bytes.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::amount::parse_amount;
use super::payer::Payer;

/// Kind of payment notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "payment.succeeded")]
    PaymentSucceeded,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "payment.error")]
    PaymentError,
}

impl WebhookEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventType::PaymentSucceeded => "payment.succeeded",
            WebhookEventType::PaymentFailed => "payment.failed",
            WebhookEventType::PaymentError => "payment.error",
        }
    }

    /// Status string carried alongside the type.
    pub fn status(&self) -> &'static str {
        match self {
            WebhookEventType::PaymentSucceeded => "approved",
            WebhookEventType::PaymentFailed => "declined",
            WebhookEventType::PaymentError => "error",
        }
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payer snapshot in the gateway's naming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

impl From<&Payer> for CustomerSnapshot {
    fn from(payer: &Payer) -> Self {
        let (first_name, last_name) = payer.split_name();
        Self {
            first_name,
            last_name,
            email: payer.email.clone(),
            address1: payer.address1.clone(),
            address2: payer.address2.clone(),
            city: payer.city.clone(),
            postcode: payer.postcode.clone(),
            country: payer.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEventData {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub order_reference: Option<String>,
    pub transaction_id: Option<String>,
    pub customer: CustomerSnapshot,
    pub gateway_response: BTreeMap<String, String>,
}

/// Signed notification sent to every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: WebhookEventType,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channel: Option<String>,
    pub created_at: String,
    pub order_reference: Option<String>,
    pub data: WebhookEventData,
}

/// Inputs for [`WebhookEvent::new`].
#[derive(Debug, Clone)]
pub struct WebhookEventParams<'a> {
    pub event_type: WebhookEventType,
    pub amount: &'a str,
    pub currency: &'a str,
    pub order_reference: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
    pub customer: CustomerSnapshot,
    pub gateway_response: BTreeMap<String, String>,
    pub channel: Option<&'a str>,
}

impl WebhookEvent {
    pub fn new(params: WebhookEventParams<'_>) -> Self {
        Self::at(params, Timestamp::now())
    }

    /// Builds an event stamped with `created_at`.
    pub fn at(params: WebhookEventParams<'_>, created_at: Timestamp) -> Self {
        let order_reference = params
            .order_reference
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Self {
            event_type: params.event_type,
            status: params.event_type.status().to_string(),
            channel: params.channel.map(str::to_string),
            created_at: created_at.to_rfc3339(),
            order_reference: order_reference.clone(),
            data: WebhookEventData {
                amount: parse_amount(params.amount).unwrap_or(Decimal::ZERO),
                currency: params.currency.to_string(),
                order_reference,
                transaction_id: params
                    .transaction_id
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
                customer: params.customer,
                gateway_response: params.gateway_response,
            },
        }
    }

    /// Serialized body exactly as delivered and signed.
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn payer() -> Payer {
        Payer {
            name: "Ada King Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            address1: "1 Way".to_string(),
            address2: String::new(),
            city: "London".to_string(),
            postcode: "N1".to_string(),
            country: "GB".to_string(),
        }
    }

    #[test]
    fn serializes_to_documented_shape() {
        let payer = payer();
        let mut raw = BTreeMap::new();
        raw.insert("response".to_string(), "1".to_string());

        let event = WebhookEvent::at(
            WebhookEventParams {
                event_type: WebhookEventType::PaymentSucceeded,
                amount: "10.00",
                currency: "GBP",
                order_reference: Some("ORD-1"),
                transaction_id: Some("TX1"),
                customer: CustomerSnapshot::from(&payer),
                gateway_response: raw,
                channel: Some("imprints"),
            },
            Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
        );

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "payment.succeeded",
                "status": "approved",
                "channel": "imprints",
                "createdAt": "2024-05-01T09:00:00.000Z",
                "orderReference": "ORD-1",
                "data": {
                    "amount": 10.0,
                    "currency": "GBP",
                    "orderReference": "ORD-1",
                    "transactionId": "TX1",
                    "customer": {
                        "firstName": "Ada",
                        "lastName": "King Lovelace",
                        "email": "ada@example.com",
                        "address1": "1 Way",
                        "address2": "",
                        "city": "London",
                        "postcode": "N1",
                        "country": "GB"
                    },
                    "gatewayResponse": { "response": "1" }
                }
            })
        );
    }

    #[test]
    fn error_event_without_channel_or_reference() {
        let payer = Payer::default();
        let event = WebhookEvent::new(WebhookEventParams {
            event_type: WebhookEventType::PaymentError,
            amount: "5.00",
            currency: "GBP",
            order_reference: Some(""),
            transaction_id: None,
            customer: CustomerSnapshot::from(&payer),
            gateway_response: BTreeMap::new(),
            channel: None,
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "payment.error");
        assert_eq!(value["status"], "error");
        assert!(value.get("channel").is_none());
        assert!(value["orderReference"].is_null());
        assert!(value["data"]["transactionId"].is_null());
    }

    #[test]
    fn status_follows_type() {
        assert_eq!(WebhookEventType::PaymentSucceeded.status(), "approved");
        assert_eq!(WebhookEventType::PaymentFailed.status(), "declined");
        assert_eq!(WebhookEventType::PaymentError.status(), "error");
    }

    #[test]
    fn body_round_trips_through_json() {
        let payer = payer();
        let event = WebhookEvent::new(WebhookEventParams {
            event_type: WebhookEventType::PaymentFailed,
            amount: "3.50",
            currency: "GBP",
            order_reference: None,
            transaction_id: None,
            customer: CustomerSnapshot::from(&payer),
            gateway_response: BTreeMap::new(),
            channel: None,
        });

        let body = event.to_body().unwrap();
        let parsed: WebhookEvent = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, event);
    }
}

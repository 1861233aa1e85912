//! ProcessPaymentHandler - stateless one-shot charge submission.
//!
//! The request carries everything: token, amount, payer, 3DS evidence. No
//! session is created, so the navigate-once rule does not apply; the
//! redirect target is only computed and returned.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use crate::application::webhook_dispatcher::{DispatchHandle, WebhookDispatcher};
use crate::domain::checkout::{
    format_amount, CheckoutPolicy, PaymentOutcome, RedirectDetails, RedirectResolver,
    WebhookEvent, WebhookEventParams, WebhookEventType,
};
use crate::ports::{ChargeRequest, GatewayError, PaymentGateway};

/// Result of a completed gateway call, approved or not.
#[derive(Debug)]
pub struct ProcessPaymentResult {
    pub outcome: PaymentOutcome,
    /// Where the page should navigate; `None` when no target is configured.
    pub redirect_url: Option<Url>,
    /// Set when the gateway could not be reached; `outcome` is then a server error.
    pub gateway_error: Option<GatewayError>,
    pub deliveries: DispatchHandle,
}

impl ProcessPaymentResult {
    pub fn is_transport_failure(&self) -> bool {
        self.gateway_error.is_some()
    }
}

/// Rejections that happen before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessPaymentError {
    #[error("Missing payment token or amount")]
    MissingTokenOrAmount,

    #[error("Blocked by anti-bot check")]
    Blocked,

    #[error("Currency not supported")]
    UnsupportedCurrency,

    #[error("Gateway not configured")]
    NotConfigured,
}

pub struct ProcessPaymentHandler {
    gateway: Arc<dyn PaymentGateway>,
    webhooks: WebhookDispatcher,
    redirects: Arc<RedirectResolver>,
    policy: Arc<CheckoutPolicy>,
    channel: Option<String>,
}

impl ProcessPaymentHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        webhooks: WebhookDispatcher,
        redirects: Arc<RedirectResolver>,
        policy: Arc<CheckoutPolicy>,
        channel: Option<String>,
    ) -> Self {
        Self {
            gateway,
            webhooks,
            redirects,
            policy,
            channel,
        }
    }

    pub async fn handle(
        &self,
        mut request: ChargeRequest,
    ) -> Result<ProcessPaymentResult, ProcessPaymentError> {
        // 1. Reject incomplete submissions
        let amount = match request.amount {
            Some(amount) if amount > Decimal::ZERO && !request.payment_token.trim().is_empty() => {
                amount
            }
            _ => return Err(ProcessPaymentError::MissingTokenOrAmount),
        };

        // 2. Honeypot
        if request.is_honeypot_filled() {
            tracing::info!(
                order_reference = request.order_reference().unwrap_or(""),
                "Payment blocked by honeypot"
            );
            return Err(ProcessPaymentError::Blocked);
        }

        // 3. Currency
        if request.currency.trim().is_empty() {
            request.currency = self.policy.default_currency.clone();
        }
        if !self.policy.validator.is_supported_currency(&request.currency) {
            return Err(ProcessPaymentError::UnsupportedCurrency);
        }

        // 4. Submit once
        let (outcome, gateway_error) = match self.gateway.submit(&request).await {
            Ok(outcome) => (outcome, None),
            Err(GatewayError::NotConfigured(detail)) => {
                tracing::error!(error = %detail, "Payment gateway credential missing");
                return Err(ProcessPaymentError::NotConfigured);
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    order_reference = request.order_reference().unwrap_or(""),
                    "Payment gateway unreachable"
                );
                (PaymentOutcome::server_error(), Some(err))
            }
        };

        // 5. Notify subscribers
        let event_type = match (&gateway_error, outcome.approved) {
            (Some(_), _) => WebhookEventType::PaymentError,
            (None, true) => WebhookEventType::PaymentSucceeded,
            (None, false) => WebhookEventType::PaymentFailed,
        };
        let amount = format_amount(amount);
        let event = WebhookEvent::new(WebhookEventParams {
            event_type,
            amount: &amount,
            currency: &request.currency,
            order_reference: request.order_reference(),
            transaction_id: outcome.transaction_id.as_deref(),
            customer: request.customer(),
            gateway_response: outcome.raw_gateway_fields.clone(),
            channel: self.channel.as_deref(),
        });
        let deliveries = self.webhooks.dispatch(&event);

        // 6. Redirect target
        let details = RedirectDetails {
            order_reference: request.order_reference().map(str::to_string),
            amount,
            currency: request.currency.clone(),
        };
        let redirect_url = match self.redirects.resolve_target(&outcome, &details) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(error = %err, "No redirect target for payment outcome");
                None
            }
        };

        tracing::info!(
            approved = outcome.approved,
            transaction_id = outcome.transaction_id.as_deref().unwrap_or(""),
            order_reference = request.order_reference().unwrap_or(""),
            "Payment processed"
        );

        Ok(ProcessPaymentResult {
            outcome,
            redirect_url,
            gateway_error,
            deliveries,
        })
    }
}

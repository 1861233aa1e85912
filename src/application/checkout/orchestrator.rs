//! CheckoutOrchestrator - drives one checkout session from page load to redirect.
//!
//! Each session owns exactly one orchestrator. Events from the page (form
//! edits, widget tokens, pay, 3DS results) arrive as `&mut self` calls, so
//! the only concurrency inside a session is the webhook fan-out, which runs
//! detached.
//!
//! # Guarantees
//!
//! - At most one gateway submission in flight (`processing` flag)
//! - At most one webhook dispatch and one redirect per session (`terminal` flag)
//! - The payment token is dropped after every submission attempt

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::webhook_dispatcher::{DispatchHandle, DispatchReport, WebhookDispatcher};
use crate::domain::checkout::{
    CheckoutError, CheckoutPolicy, CheckoutSession, CheckoutState, CustomerSnapshot, DeepLink,
    MissingFieldDetector,
    PayerField, PaymentMode, PaymentOutcome, RedirectResolver, SessionUpdate, ThreeDsEvidence,
    WebhookEvent, WebhookEventParams, WebhookEventType, CHALLENGE_CANCELLED_REASON,
    INVALID_LINK_MESSAGE,
};
use crate::domain::foundation::CheckoutSessionId;
use crate::domain::signing::SignatureCodec;
use crate::ports::{
    ChallengeError, ChallengeRequest, ChargeRequest, GatewayError, PaymentGateway,
    ThreeDsChallenge,
};

const APPROVED_MESSAGE: &str = "Payment approved.";
const DECLINED_MESSAGE: &str = "Payment declined.";
const WALLETS_DISABLED_MESSAGE: &str = "Wallet payments are not available.";

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct CheckoutServices {
    pub policy: Arc<CheckoutPolicy>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub challenge: Arc<dyn ThreeDsChallenge>,
    pub webhooks: WebhookDispatcher,
    pub redirects: Arc<RedirectResolver>,
    /// Verifies signed deep links.
    pub link_codec: SignatureCodec,
    /// Optional `channel` stamped on webhook events.
    pub channel: Option<String>,
}

/// What an event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Input recorded; nothing was submitted.
    Waiting,
    /// The session had already finished; the event was dropped.
    Ignored,
    /// A terminal outcome was reached.
    Finished(PaymentOutcome),
    /// Wallet decline the payer can fix by completing these fields.
    RetryRequired(BTreeSet<PayerField>),
}

pub struct CheckoutOrchestrator {
    session: CheckoutSession,
    services: CheckoutServices,
    detector: MissingFieldDetector,
    deliveries: Vec<DispatchHandle>,
}

impl CheckoutOrchestrator {
    /// Opens a session from an already-parsed deep link.
    pub fn new(services: CheckoutServices, link: DeepLink, mode: PaymentMode) -> Self {
        let mut session = CheckoutSession::new(link.initial, mode);
        session.fill_defaults(
            &services.policy.default_currency,
            &services.policy.default_country,
        );
        if !link.payload_valid {
            session.mark_payload_invalid();
            session.set_message(INVALID_LINK_MESSAGE);
        }

        tracing::info!(
            session_id = %session.id(),
            mode = ?mode,
            signed = link.signature_checked,
            payload_valid = link.payload_valid,
            order_reference = session.order_reference().unwrap_or(""),
            "Checkout session opened"
        );

        Self {
            session,
            services,
            detector: MissingFieldDetector::new(),
            deliveries: Vec::new(),
        }
    }

    /// Opens a session from raw deep-link query parameters.
    pub fn from_query<I, K, V>(services: CheckoutServices, params: I, mode: PaymentMode) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let link = DeepLink::from_query(params, &services.link_codec);
        Self::new(services, link, mode)
    }

    pub fn id(&self) -> CheckoutSessionId {
        self.session.id()
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    /// Waits for webhook deliveries started by this session.
    pub async fn flush_webhooks(&mut self) -> DispatchReport {
        let mut total = DispatchReport::default();
        for handle in self.deliveries.drain(..) {
            let report = handle.wait().await;
            total.delivered += report.delivered;
            total.failed += report.failed;
        }
        total
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Page events
    // ════════════════════════════════════════════════════════════════════════════

    /// Applies a form edit.
    ///
    /// # Errors
    ///
    /// - `Finished` / `Busy` when the session cannot take input
    /// - `Locked` when the edit touches a deep-linked field
    pub fn update(&mut self, update: SessionUpdate) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        if update.mode == Some(PaymentMode::Wallet) && !self.services.policy.wallets_enabled {
            return Err(CheckoutError::validation(WALLETS_DISABLED_MESSAGE));
        }

        let mode_changed = update.mode.is_some_and(|m| m != self.session.mode());
        self.session.apply_update(update)?;

        if mode_changed {
            self.session.clear_token();
            match self.session.state() {
                CheckoutState::AwaitingToken => self.transition(CheckoutState::Idle)?,
                CheckoutState::AwaitingRetry => {
                    self.session.set_missing_fields(BTreeSet::new());
                    self.session.clear_message();
                    self.transition(CheckoutState::Idle)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Tokenization widget change event.
    ///
    /// Card tokens only enable the pay action. A new, complete wallet token
    /// is validated and submitted straight away.
    pub async fn on_token(
        &mut self,
        complete: bool,
        token: Option<String>,
    ) -> Result<CheckoutStep, CheckoutError> {
        if self.session.is_terminal() {
            return Ok(CheckoutStep::Ignored);
        }
        if self.session.is_processing() {
            return Err(CheckoutError::Busy);
        }
        if !self.session.state().accepts_input() {
            return Err(self.invalid_state());
        }

        match self.session.mode() {
            PaymentMode::Card => {
                self.session.record_token(complete, token);
                if self.session.state() == CheckoutState::Idle {
                    self.transition(CheckoutState::AwaitingToken)?;
                }
                Ok(CheckoutStep::Waiting)
            }
            PaymentMode::Wallet => self.on_wallet_token(complete, token).await,
        }
    }

    /// Card pay action. Validates and launches the 3DS challenge.
    ///
    /// Returns the payment information the challenge widget needs.
    pub async fn pay(&mut self) -> Result<ChallengeRequest, CheckoutError> {
        self.ensure_open()?;
        if self.session.mode() != PaymentMode::Card || !self.session.state().accepts_input() {
            return Err(self.invalid_state());
        }

        self.validate()?;

        if !self.services.challenge.is_ready() {
            self.transition(CheckoutState::Idle)?;
            let message = ChallengeError::NotReady.to_string();
            self.session.set_message(message.clone());
            return Err(CheckoutError::Validation(message));
        }

        let request = ChallengeRequest::from_session(&self.session);
        self.transition(CheckoutState::AwaitingChallenge)?;

        if let Err(e) = self.services.challenge.start(&request).await {
            tracing::warn!(session_id = %self.session.id(), error = %e, "3DS challenge failed to start");
            self.fail_challenge();
            return Err(CheckoutError::ChallengeFailure(e.to_string()));
        }

        tracing::debug!(session_id = %self.session.id(), "3DS challenge started");
        Ok(request)
    }

    /// 3DS widget reported success. Submits to the gateway.
    pub async fn on_challenge_complete(
        &mut self,
        evidence: ThreeDsEvidence,
    ) -> Result<CheckoutStep, CheckoutError> {
        if self.session.is_terminal() {
            return Ok(CheckoutStep::Ignored);
        }
        if self.session.is_processing() {
            return Err(CheckoutError::Busy);
        }
        if self.session.state() != CheckoutState::AwaitingChallenge {
            return Err(self.invalid_state());
        }
        self.submit(evidence).await
    }

    /// 3DS widget reported cancellation or failure. Terminal.
    pub fn on_challenge_failed(&mut self) -> Result<CheckoutStep, CheckoutError> {
        if self.session.is_terminal() {
            return Ok(CheckoutStep::Ignored);
        }
        if self.session.state() != CheckoutState::AwaitingChallenge {
            return Err(self.invalid_state());
        }
        Ok(self.fail_challenge())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════════════

    async fn on_wallet_token(
        &mut self,
        complete: bool,
        token: Option<String>,
    ) -> Result<CheckoutStep, CheckoutError> {
        self.session.record_token(complete, token);
        if !self.session.has_usable_token() {
            return Ok(CheckoutStep::Waiting);
        }

        let token = self.session.payment_token().unwrap_or_default().to_string();
        if self.session.last_wallet_token() == Some(token.as_str()) {
            tracing::debug!(session_id = %self.session.id(), "Wallet token already submitted, ignoring");
            return Ok(CheckoutStep::Waiting);
        }
        if !self.services.policy.wallets_enabled {
            return Err(CheckoutError::validation(WALLETS_DISABLED_MESSAGE));
        }

        if self.session.state() == CheckoutState::AwaitingRetry {
            self.session.set_missing_fields(BTreeSet::new());
            self.transition(CheckoutState::Idle)?;
        }
        if self.session.state() == CheckoutState::Idle {
            self.transition(CheckoutState::AwaitingToken)?;
        }

        self.validate()?;
        self.session.remember_wallet_token(&token);
        self.submit(ThreeDsEvidence::default()).await
    }

    /// Runs the policy checks. On failure the session goes back to `Idle`
    /// with the user-facing message set.
    fn validate(&mut self) -> Result<(), CheckoutError> {
        self.transition(CheckoutState::Validating)?;

        match self.services.policy.check(&self.session) {
            Ok(()) => {
                self.session.clear_message();
                Ok(())
            }
            Err(err) => {
                self.transition(CheckoutState::Idle)?;
                self.session.set_message(err.user_message());
                if err == CheckoutError::Blocked {
                    tracing::info!(session_id = %self.session.id(), "Submission blocked by honeypot");
                } else {
                    tracing::debug!(session_id = %self.session.id(), error = %err, "Checkout validation failed");
                }
                Err(err)
            }
        }
    }

    async fn submit(&mut self, evidence: ThreeDsEvidence) -> Result<CheckoutStep, CheckoutError> {
        if !self.session.begin_processing() {
            return Err(CheckoutError::Busy);
        }
        if let Err(e) = self.transition(CheckoutState::Submitting) {
            self.session.end_processing();
            return Err(e);
        }

        let request = ChargeRequest::from_session(&self.session, evidence);
        tracing::info!(
            session_id = %self.session.id(),
            mode = ?self.session.mode(),
            order_reference = request.order_reference().unwrap_or(""),
            "Submitting payment"
        );

        let result = self.services.gateway.submit(&request).await;
        self.session.clear_token();
        self.session.end_processing();

        match result {
            Err(GatewayError::NotConfigured(detail)) => {
                tracing::error!(session_id = %self.session.id(), detail = %detail, "Payment gateway not configured");
                self.transition(CheckoutState::Idle)?;
                let err = CheckoutError::configuration(detail);
                self.session.set_message(err.user_message());
                Err(err)
            }
            Err(e) => {
                tracing::warn!(session_id = %self.session.id(), error = %e, "Payment gateway transport failure");
                self.transition(CheckoutState::Failed)?;
                self.session
                    .set_message(CheckoutError::Transport(e.to_string()).user_message());
                Ok(self.finish(WebhookEventType::PaymentError, PaymentOutcome::server_error()))
            }
            Ok(outcome) if outcome.approved => {
                self.transition(CheckoutState::Succeeded)?;
                self.session.set_message(APPROVED_MESSAGE);
                let step = self.finish(WebhookEventType::PaymentSucceeded, outcome);
                if self.session.mode() == PaymentMode::Card {
                    self.session.clear_card_inputs();
                }
                Ok(step)
            }
            Ok(outcome) => {
                if self.session.mode() == PaymentMode::Wallet {
                    let reason = outcome.decline_reason.as_deref().unwrap_or_default();
                    let missing = self.detector.detect(reason, self.session.payer());
                    if !missing.is_empty() {
                        return self.await_retry(missing);
                    }
                }
                tracing::info!(
                    session_id = %self.session.id(),
                    reason = outcome.reason_code().as_deref().unwrap_or(""),
                    "Payment declined"
                );
                self.transition(CheckoutState::Failed)?;
                self.session.set_message(DECLINED_MESSAGE);
                Ok(self.finish(WebhookEventType::PaymentFailed, outcome))
            }
        }
    }

    fn await_retry(
        &mut self,
        missing: BTreeSet<PayerField>,
    ) -> Result<CheckoutStep, CheckoutError> {
        self.transition(CheckoutState::AwaitingRetry)?;
        let labels = missing
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", ");
        self.session
            .set_message(format!("Please complete your {} and try again.", labels));
        self.session.set_missing_fields(missing.clone());

        tracing::info!(
            session_id = %self.session.id(),
            missing = %labels,
            "Wallet payment declined for missing details, awaiting retry"
        );
        Ok(CheckoutStep::RetryRequired(missing))
    }

    fn fail_challenge(&mut self) -> CheckoutStep {
        self.session.clear_token();
        if self.transition(CheckoutState::Failed).is_err() {
            return CheckoutStep::Ignored;
        }
        self.session
            .set_message(CheckoutError::ChallengeFailure(String::new()).user_message());
        tracing::info!(session_id = %self.session.id(), "3DS challenge cancelled");
        self.finish(
            WebhookEventType::PaymentFailed,
            PaymentOutcome::declined(CHALLENGE_CANCELLED_REASON),
        )
    }

    /// Dispatches the webhook and redirects. Runs at most once per session.
    fn finish(&mut self, event_type: WebhookEventType, outcome: PaymentOutcome) -> CheckoutStep {
        if self.session.is_terminal() {
            return CheckoutStep::Ignored;
        }

        let event = WebhookEvent::new(WebhookEventParams {
            event_type,
            amount: self.session.amount(),
            currency: self.session.currency(),
            order_reference: self.session.order_reference(),
            transaction_id: outcome.transaction_id.as_deref(),
            customer: CustomerSnapshot::from(self.session.payer()),
            gateway_response: outcome.raw_gateway_fields.clone(),
            channel: self.services.channel.as_deref(),
        });
        let handle = self.services.webhooks.dispatch(&event);
        self.deliveries.push(handle);

        match self
            .services
            .redirects
            .redirect_once(&mut self.session, &outcome)
        {
            Ok(Some(url)) => {
                tracing::info!(
                    session_id = %self.session.id(),
                    approved = outcome.approved,
                    redirect = %url,
                    "Checkout finished"
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(session_id = %self.session.id(), error = %e, "Checkout finished without redirect target");
                self.session
                    .set_message(CheckoutError::configuration(e.to_string()).user_message());
            }
        }

        CheckoutStep::Finished(outcome)
    }

    fn ensure_open(&self) -> Result<(), CheckoutError> {
        if self.session.is_terminal() {
            return Err(CheckoutError::Finished);
        }
        if self.session.is_processing() {
            return Err(CheckoutError::Busy);
        }
        Ok(())
    }

    fn transition(&mut self, target: CheckoutState) -> Result<(), CheckoutError> {
        self.session
            .transition(target)
            .map_err(|_| self.invalid_state())
    }

    fn invalid_state(&self) -> CheckoutError {
        CheckoutError::InvalidState {
            state: format!("{:?}", self.session.state()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::challenge::ScriptedChallenge;
    use crate::adapters::gateway::MockPaymentGateway;
    use crate::adapters::webhooks::RecordingWebhookTransport;
    use crate::domain::checkout::{RedirectEnvironment, RedirectTargets};
    use url::Url;

    struct Harness {
        gateway: MockPaymentGateway,
        challenge: ScriptedChallenge,
        transport: Arc<RecordingWebhookTransport>,
        services: CheckoutServices,
    }

    fn harness() -> Harness {
        let gateway = MockPaymentGateway::new();
        let challenge = ScriptedChallenge::new();
        let transport = Arc::new(RecordingWebhookTransport::new());
        let services = CheckoutServices {
            policy: Arc::new(CheckoutPolicy::default()),
            gateway: Arc::new(gateway.clone()),
            challenge: Arc::new(challenge.clone()),
            webhooks: WebhookDispatcher::new(
                transport.clone(),
                vec!["https://hooks.example.com/a".to_string()],
                SignatureCodec::new("whsec"),
            ),
            redirects: Arc::new(RedirectResolver::new(
                RedirectEnvironment::Staging,
                RedirectTargets {
                    success_staging: Url::parse("https://shop.example.com/ok").ok(),
                    failure_staging: Url::parse("https://shop.example.com/fail").ok(),
                    ..Default::default()
                },
            )),
            link_codec: SignatureCodec::unconfigured(),
            channel: None,
        };
        Harness {
            gateway,
            challenge,
            transport,
            services,
        }
    }

    fn card_session(services: CheckoutServices) -> CheckoutOrchestrator {
        CheckoutOrchestrator::from_query(
            services,
            [
                ("amount", "10.00"),
                ("currency", "GBP"),
                ("order_reference", "ORD-1"),
                ("full_name", "Ada Lovelace"),
                ("email", "ada@example.com"),
                ("postcode", "N1 9GU"),
            ],
            PaymentMode::Card,
        )
    }

    #[tokio::test]
    async fn card_token_enables_pay() {
        let h = harness();
        let mut checkout = card_session(h.services);

        let step = checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();

        assert_eq!(step, CheckoutStep::Waiting);
        assert_eq!(checkout.session().state(), CheckoutState::AwaitingToken);
        assert!(checkout.session().can_pay());
        assert_eq!(h.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn pay_starts_challenge_with_payment_info() {
        let h = harness();
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();

        let request = checkout.pay().await.unwrap();

        assert_eq!(request.amount, "10.00");
        assert_eq!(request.payment_token, "tok_1");
        assert_eq!(checkout.session().state(), CheckoutState::AwaitingChallenge);
        assert_eq!(h.challenge.requests().len(), 1);
    }

    #[tokio::test]
    async fn pay_without_token_returns_to_idle() {
        let h = harness();
        let mut checkout = card_session(h.services);

        let err = checkout.pay().await.unwrap_err();

        assert_eq!(err, CheckoutError::validation("Please complete card details first."));
        assert_eq!(checkout.session().state(), CheckoutState::Idle);
        assert_eq!(
            checkout.session().message(),
            Some("Please complete card details first.")
        );
    }

    #[tokio::test]
    async fn challenge_not_ready_keeps_session_open() {
        let h = harness();
        h.challenge.set_ready(false);
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();

        let err = checkout.pay().await.unwrap_err();

        assert_eq!(err, CheckoutError::validation("3-D Secure not ready."));
        assert_eq!(checkout.session().state(), CheckoutState::Idle);
        assert!(!checkout.session().is_terminal());
    }

    #[tokio::test]
    async fn challenge_start_failure_is_terminal() {
        let h = harness();
        h.challenge.fail_next_start();
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();

        let err = checkout.pay().await.unwrap_err();

        assert!(matches!(err, CheckoutError::ChallengeFailure(_)));
        assert_eq!(checkout.session().state(), CheckoutState::Failed);
        assert!(checkout.session().is_terminal());
    }

    #[tokio::test]
    async fn challenge_failure_redirects_with_cancel_code() {
        let h = harness();
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();
        checkout.pay().await.unwrap();

        let step = checkout.on_challenge_failed().unwrap();
        checkout.flush_webhooks().await;

        assert!(matches!(step, CheckoutStep::Finished(ref o) if !o.approved));
        let url = checkout.session().redirect_url().unwrap();
        assert!(url.as_str().contains("error_code=3ds_cancelled"));
        assert_eq!(h.gateway.call_count(), 0);

        let deliveries = h.transport.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].json()["type"], "payment.failed");
    }

    #[tokio::test]
    async fn late_callbacks_after_terminal_are_ignored() {
        let h = harness();
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();
        checkout.pay().await.unwrap();
        checkout.on_challenge_failed().unwrap();
        let first_redirect = checkout.session().redirect_url().cloned();

        let late_complete = checkout
            .on_challenge_complete(ThreeDsEvidence::default())
            .await
            .unwrap();
        let late_failure = checkout.on_challenge_failed().unwrap();
        checkout.flush_webhooks().await;

        assert_eq!(late_complete, CheckoutStep::Ignored);
        assert_eq!(late_failure, CheckoutStep::Ignored);
        assert_eq!(checkout.session().redirect_url().cloned(), first_redirect);
        assert_eq!(h.gateway.call_count(), 0);
        assert_eq!(h.transport.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn transport_error_is_server_error_failure() {
        let h = harness();
        h.gateway.push_error(GatewayError::transport("connection reset"));
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();
        checkout.pay().await.unwrap();

        let step = checkout
            .on_challenge_complete(ThreeDsEvidence::default())
            .await
            .unwrap();
        checkout.flush_webhooks().await;

        assert_eq!(step, CheckoutStep::Finished(PaymentOutcome::server_error()));
        assert_eq!(checkout.session().state(), CheckoutState::Failed);
        assert!(checkout
            .session()
            .redirect_url()
            .unwrap()
            .as_str()
            .contains("error_code=server_error"));
        assert_eq!(h.transport.deliveries()[0].json()["type"], "payment.error");
        assert_eq!(checkout.session().payment_token(), None);
        assert!(!checkout.session().is_processing());
    }

    #[tokio::test]
    async fn unconfigured_gateway_returns_to_idle_without_side_effects() {
        let mut h = harness();
        h.services.gateway = Arc::new(MockPaymentGateway::unconfigured());
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();
        checkout.pay().await.unwrap();

        let err = checkout
            .on_challenge_complete(ThreeDsEvidence::default())
            .await
            .unwrap_err();
        checkout.flush_webhooks().await;

        assert!(matches!(err, CheckoutError::Configuration(_)));
        assert_eq!(checkout.session().state(), CheckoutState::Idle);
        assert!(!checkout.session().is_terminal());
        assert_eq!(checkout.session().redirect_url(), None);
        assert!(h.transport.deliveries().is_empty());
    }

    #[tokio::test]
    async fn card_decline_is_terminal_failure() {
        let h = harness();
        h.gateway.push_outcome(PaymentOutcome::declined("DECLINE"));
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();
        checkout.pay().await.unwrap();

        checkout
            .on_challenge_complete(ThreeDsEvidence::default())
            .await
            .unwrap();

        assert_eq!(checkout.session().state(), CheckoutState::Failed);
        assert!(checkout
            .session()
            .redirect_url()
            .unwrap()
            .as_str()
            .ends_with("status=failed&order_reference=ORD-1&error_code=DECLINE"));
    }

    #[tokio::test]
    async fn repeated_wallet_token_is_not_resubmitted() {
        let h = harness();
        h.gateway.push_outcome(PaymentOutcome::declined("missing_address"));
        let mut checkout = CheckoutOrchestrator::from_query(
            h.services,
            [("amount", "5.00"), ("currency", "GBP")],
            PaymentMode::Wallet,
        );

        let first = checkout.on_token(true, Some("wallet_1".to_string())).await.unwrap();
        let again = checkout.on_token(true, Some("wallet_1".to_string())).await.unwrap();

        assert!(matches!(first, CheckoutStep::RetryRequired(_)));
        assert_eq!(again, CheckoutStep::Waiting);
        assert_eq!(h.gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn wallet_retry_after_correction_succeeds() {
        let h = harness();
        h.gateway.push_outcome(PaymentOutcome::declined("missing_address"));
        let mut checkout = CheckoutOrchestrator::from_query(
            h.services,
            [("amount", "5.00"), ("currency", "GBP")],
            PaymentMode::Wallet,
        );

        checkout.on_token(true, Some("wallet_1".to_string())).await.unwrap();
        assert_eq!(checkout.session().state(), CheckoutState::AwaitingRetry);

        checkout
            .update(SessionUpdate {
                address1: Some("1 Way".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(checkout.session().missing_fields().is_empty());

        let step = checkout.on_token(true, Some("wallet_2".to_string())).await.unwrap();
        checkout.flush_webhooks().await;

        assert!(matches!(step, CheckoutStep::Finished(ref o) if o.approved));
        assert_eq!(checkout.session().state(), CheckoutState::Succeeded);
        assert_eq!(h.gateway.call_count(), 2);
        assert_eq!(h.transport.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn locked_fields_reject_edits() {
        let h = harness();
        let mut checkout = card_session(h.services);

        let err = checkout
            .update(SessionUpdate {
                amount: Some("0.01".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(err, CheckoutError::Locked("amount".to_string()));
        assert_eq!(checkout.session().amount(), "10.00");
    }

    #[tokio::test]
    async fn switching_mode_drops_card_token() {
        let h = harness();
        let mut checkout = card_session(h.services);
        checkout.on_token(true, Some("tok_1".to_string())).await.unwrap();

        checkout
            .update(SessionUpdate {
                mode: Some(PaymentMode::Wallet),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(checkout.session().payment_token(), None);
        assert_eq!(checkout.session().state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn switching_to_card_after_wallet_decline_can_pay() {
        let h = harness();
        h.gateway.push_outcome(PaymentOutcome::declined("missing_address"));
        h.gateway.push_outcome(PaymentOutcome::approved("TX7"));
        let mut checkout = CheckoutOrchestrator::from_query(
            h.services,
            [("amount", "5.00"), ("currency", "GBP")],
            PaymentMode::Wallet,
        );
        checkout.on_token(true, Some("wallet_1".to_string())).await.unwrap();
        assert_eq!(checkout.session().state(), CheckoutState::AwaitingRetry);

        checkout
            .update(SessionUpdate {
                mode: Some(PaymentMode::Card),
                name: Some("Ada Lovelace".to_string()),
                email: Some("ada@example.com".to_string()),
                postcode: Some("N1 9GU".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(checkout.session().state(), CheckoutState::Idle);
        assert!(checkout.session().missing_fields().is_empty());
        assert_eq!(checkout.session().message(), None);

        checkout.on_token(true, Some("tok_card".to_string())).await.unwrap();
        assert_eq!(checkout.session().state(), CheckoutState::AwaitingToken);
        assert!(checkout.session().can_pay());

        checkout.pay().await.unwrap();
        let step = checkout
            .on_challenge_complete(ThreeDsEvidence::default())
            .await
            .unwrap();

        assert!(matches!(step, CheckoutStep::Finished(ref o) if o.approved));
        assert_eq!(checkout.session().state(), CheckoutState::Succeeded);
        assert_eq!(h.gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn defaults_fill_currency_and_country() {
        let h = harness();
        let checkout =
            CheckoutOrchestrator::from_query(h.services, [("amount", "5.00")], PaymentMode::Card);

        assert_eq!(checkout.session().currency(), "GBP");
        assert_eq!(checkout.session().payer().country, "GB");
        assert!(!checkout.session().locks().currency);
    }
}

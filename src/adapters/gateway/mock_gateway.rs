//! Mock payment gateway for testing.
//!
//! Provides a configurable implementation of `PaymentGateway` for unit and
//! integration tests. Supports:
//! - Queued outcomes, consumed in order
//! - Error injection
//! - Call tracking

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::checkout::PaymentOutcome;
use crate::ports::{ChargeRequest, GatewayError, PaymentGateway};

/// Mock gateway.
///
/// With nothing queued every submission is approved with a generated
/// transaction id.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.push_outcome(PaymentOutcome::declined("missing_address"));
/// gateway.push_error(GatewayError::transport("timeout"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<PaymentOutcome, GatewayError>>,
    calls: Vec<ChargeRequest>,
    not_configured: bool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway without credentials. Calls fail before anything is sent.
    pub fn unconfigured() -> Self {
        let gateway = Self::new();
        gateway.state().not_configured = true;
        gateway
    }

    pub fn push_outcome(&self, outcome: PaymentOutcome) {
        self.state().responses.push_back(Ok(outcome));
    }

    pub fn push_error(&self, error: GatewayError) {
        self.state().responses.push_back(Err(error));
    }

    /// Every request submitted so far.
    pub fn calls(&self) -> Vec<ChargeRequest> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn submit(&self, request: &ChargeRequest) -> Result<PaymentOutcome, GatewayError> {
        let mut state = self.state();
        if state.not_configured {
            return Err(GatewayError::NotConfigured("security key missing".to_string()));
        }
        state.calls.push(request.clone());
        let call_number = state.calls.len();

        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(PaymentOutcome::approved(format!("mock_tx_{}", call_number))))
    }
}

//! Terminal redirect resolution.
//!
//! A session navigates away exactly once. Challenge completion, challenge
//! failure and transport errors each try to finish the session, so the
//! terminal flag on [`CheckoutSession`] decides which of them wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use super::amount::normalize_amount;
use super::outcome::PaymentOutcome;
use super::session::CheckoutSession;

/// Which set of redirect targets is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectEnvironment {
    #[default]
    Staging,
    Production,
}

impl RedirectEnvironment {
    /// `production` / `prod` (any case, trimmed) select production; anything else is staging.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "production" | "prod" => RedirectEnvironment::Production,
            _ => RedirectEnvironment::Staging,
        }
    }
}

impl FromStr for RedirectEnvironment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<'de> Deserialize<'de> for RedirectEnvironment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl fmt::Display for RedirectEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectEnvironment::Staging => f.write_str("staging"),
            RedirectEnvironment::Production => f.write_str("production"),
        }
    }
}

/// Base URLs per environment and outcome. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectTargets {
    pub success_staging: Option<Url>,
    pub failure_staging: Option<Url>,
    pub success_production: Option<Url>,
    pub failure_production: Option<Url>,
}

impl RedirectTargets {
    fn base_for(&self, environment: RedirectEnvironment, approved: bool) -> Option<&Url> {
        match (environment, approved) {
            (RedirectEnvironment::Staging, true) => self.success_staging.as_ref(),
            (RedirectEnvironment::Staging, false) => self.failure_staging.as_ref(),
            (RedirectEnvironment::Production, true) => self.success_production.as_ref(),
            (RedirectEnvironment::Production, false) => self.failure_production.as_ref(),
        }
    }
}

/// Order details echoed back on the redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectDetails {
    pub order_reference: Option<String>,
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedirectError {
    #[error("No {outcome} redirect URL configured for {environment}")]
    NotConfigured {
        environment: RedirectEnvironment,
        outcome: &'static str,
    },
}

/// Computes redirect targets and enforces the navigate-once rule.
#[derive(Debug, Clone, Default)]
pub struct RedirectResolver {
    environment: RedirectEnvironment,
    targets: RedirectTargets,
}

impl RedirectResolver {
    pub fn new(environment: RedirectEnvironment, targets: RedirectTargets) -> Self {
        Self {
            environment,
            targets,
        }
    }

    pub fn environment(&self) -> RedirectEnvironment {
        self.environment
    }

    /// Builds the redirect URL for an outcome without touching any session.
    ///
    /// # Errors
    ///
    /// `NotConfigured` when no base URL exists for the environment/outcome pair.
    pub fn resolve_target(
        &self,
        outcome: &PaymentOutcome,
        details: &RedirectDetails,
    ) -> Result<Url, RedirectError> {
        let base = self
            .targets
            .base_for(self.environment, outcome.approved)
            .ok_or(RedirectError::NotConfigured {
                environment: self.environment,
                outcome: if outcome.approved { "success" } else { "failure" },
            })?;

        let mut params: Vec<(&str, String)> = Vec::with_capacity(5);
        params.push((
            "status",
            if outcome.approved { "success" } else { "failed" }.to_string(),
        ));
        if let Some(reference) = details.order_reference.as_deref().filter(|r| !r.is_empty()) {
            params.push(("order_reference", reference.to_string()));
        }

        if outcome.approved {
            if let Some(tx) = outcome.transaction_id.as_deref().filter(|t| !t.is_empty()) {
                params.push(("transaction_id", tx.to_string()));
            }
            params.push(("amount", normalize_amount(&details.amount)));
            params.push(("currency", details.currency.clone()));
        } else if let Some(code) = outcome.reason_code() {
            params.push(("error_code", code));
        }

        Ok(set_query_params(base.clone(), &params))
    }

    /// Finishes the session and returns where to navigate.
    ///
    /// The first call flips the session's terminal flag and returns
    /// `Ok(Some(url))`; every later call returns `Ok(None)` without
    /// recomputing anything. A missing base URL still finishes the session
    /// but yields an error instead of a location.
    pub fn redirect_once(
        &self,
        session: &mut CheckoutSession,
        outcome: &PaymentOutcome,
    ) -> Result<Option<Url>, RedirectError> {
        if !session.mark_terminal() {
            tracing::debug!(session_id = %session.id(), "Redirect already issued, ignoring");
            return Ok(None);
        }

        let url = self.resolve_target(outcome, &session.redirect_details())?;
        session.set_redirect_url(url.clone());
        Ok(Some(url))
    }
}

/// Overwrites `params` on `url`, keeping unrelated query pairs in place.
fn set_query_params(mut url: Url, params: &[(&str, String)]) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(p, _)| p == k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        for (k, v) in params {
            query.append_pair(k, v);
        }
    }
    url
}

//! Maps wallet decline reasons to payer fields that are probably missing.
//!
//! Gateways describe data problems in free text ("Missing email address",
//! `missing_address`, "AVS postal code required"). The patterns below are a
//! best-effort reading of that text, good enough to point the payer at the
//! right inputs. They are not a correctness guarantee.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::payer::{Payer, PayerField};

static FIELD_PATTERNS: Lazy<Vec<(PayerField, Regex)>> = Lazy::new(|| {
    [
        (PayerField::Name, r"name|card ?holder"),
        (PayerField::Email, r"e-?mail"),
        (PayerField::Address1, r"address|street|addr1|billing[ _-]?line"),
        (PayerField::City, r"city|town"),
        (PayerField::Postcode, r"post ?code|postal|zip|avs"),
        (PayerField::Country, r"country"),
    ]
    .into_iter()
    .map(|(field, pattern)| {
        (
            field,
            Regex::new(pattern).expect("missing-field pattern is valid"),
        )
    })
    .collect()
});

/// "email address" names one field, not two.
static EMAIL_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"e-?mail[ _-]?address").expect("email pattern is valid"));

/// Heuristic decline-reason reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingFieldDetector;

impl MissingFieldDetector {
    pub fn new() -> Self {
        Self
    }

    /// Fields named by `decline_reason` that are also blank on `payer`.
    pub fn detect(&self, decline_reason: &str, payer: &Payer) -> BTreeSet<PayerField> {
        let reason = decline_reason.to_lowercase();
        if reason.trim().is_empty() {
            return BTreeSet::new();
        }
        let reason = EMAIL_ADDRESS.replace_all(&reason, "email");

        FIELD_PATTERNS
            .iter()
            .filter(|(field, pattern)| pattern.is_match(&reason) && payer.is_blank(*field))
            .map(|(field, _)| *field)
            .collect()
    }
}

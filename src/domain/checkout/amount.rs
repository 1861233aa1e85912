//! Amount and currency validation.
//!
//! Amounts travel as decimal strings with at most two fractional digits.
//! Everything here is pure and safe to call repeatedly.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("amount pattern is valid"));

/// Value returned by [`normalize_amount`] for anything that is not a valid amount.
pub const ZERO_AMOUNT: &str = "0.00";

/// Parses a raw amount, returning `None` unless it is well-formed and positive.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    if !AMOUNT_PATTERN.is_match(raw) {
        return None;
    }
    let value = Decimal::from_str(raw).ok()?;
    if value > Decimal::ZERO {
        Some(value)
    } else {
        None
    }
}

/// True when `raw` matches `^\d+(\.\d{1,2})?$` and is greater than zero.
pub fn is_valid_amount(raw: &str) -> bool {
    parse_amount(raw).is_some()
}

/// Formats a valid amount with exactly two decimals; anything else becomes `"0.00"`.
pub fn normalize_amount(raw: &str) -> String {
    match parse_amount(raw) {
        Some(value) => format_amount(value),
        None => ZERO_AMOUNT.to_string(),
    }
}

/// Renders a decimal with exactly two fractional digits.
pub fn format_amount(value: Decimal) -> String {
    let mut scaled = value.round_dp(2);
    scaled.rescale(2);
    scaled.to_string()
}

/// Checks amounts and currencies against the deployment's allow-list.
#[derive(Debug, Clone)]
pub struct AmountCurrencyValidator {
    currencies: Vec<String>,
}

impl AmountCurrencyValidator {
    /// Creates a validator for the given currency codes.
    ///
    /// Codes are compared exactly; a single-currency list is fine.
    pub fn new<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            currencies: currencies.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_valid_amount(&self, raw: &str) -> bool {
        is_valid_amount(raw)
    }

    pub fn normalize_amount(&self, raw: &str) -> String {
        normalize_amount(raw)
    }

    /// Membership in the configured allow-list.
    pub fn is_supported_currency(&self, code: &str) -> bool {
        self.currencies.iter().any(|c| c == code)
    }

    /// The allow-listed codes, in configuration order.
    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }
}

impl Default for AmountCurrencyValidator {
    fn default() -> Self {
        Self::new(["GBP"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whole_and_two_decimal_amounts() {
        assert!(is_valid_amount("1"));
        assert!(is_valid_amount("1.5"));
        assert!(is_valid_amount("1.50"));
        assert!(is_valid_amount("1250.99"));
    }

    #[test]
    fn rejects_zero_amounts() {
        assert!(!is_valid_amount("0"));
        assert!(!is_valid_amount("0.00"));
        assert!(!is_valid_amount("000.0"));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!(!is_valid_amount(""));
        assert!(!is_valid_amount("1.005"));
        assert!(!is_valid_amount("-1.00"));
        assert!(!is_valid_amount("1."));
        assert!(!is_valid_amount(".50"));
        assert!(!is_valid_amount("1,00"));
        assert!(!is_valid_amount(" 1.00"));
        assert!(!is_valid_amount("1e3"));
    }

    #[test]
    fn normalize_pads_to_two_decimals() {
        assert_eq!(normalize_amount("3"), "3.00");
        assert_eq!(normalize_amount("3.5"), "3.50");
        assert_eq!(normalize_amount("10.00"), "10.00");
    }

    #[test]
    fn normalize_falls_back_to_zero() {
        assert_eq!(normalize_amount("abc"), "0.00");
        assert_eq!(normalize_amount("0"), "0.00");
        assert_eq!(normalize_amount("1.005"), "0.00");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["3", "7.1", "99.99", "junk"] {
            let once = normalize_amount(raw);
            assert_eq!(normalize_amount(&once), once);
        }
    }

    #[test]
    fn rejects_overflowing_digits() {
        let huge = "9".repeat(40);
        assert!(!is_valid_amount(&huge));
    }

    #[test]
    fn currency_allow_list_membership() {
        let validator = AmountCurrencyValidator::new(["GBP", "EUR"]);
        assert!(validator.is_supported_currency("GBP"));
        assert!(validator.is_supported_currency("EUR"));
        assert!(!validator.is_supported_currency("USD"));
        assert!(!validator.is_supported_currency("gbp"));
        assert!(!validator.is_supported_currency(""));
    }

    #[test]
    fn default_validator_is_single_currency_gbp() {
        let validator = AmountCurrencyValidator::default();
        assert_eq!(validator.currencies(), ["GBP".to_string()]);
    }
}

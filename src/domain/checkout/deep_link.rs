//! Inbound deep links: query parameters that pre-fill and lock a checkout.
//!
//! When both a `sig` parameter and a signing secret are present, every other
//! parameter (known or not) is canonicalized and must match the signature.
//! A mismatch does not stop the page from rendering; it marks the payload
//! invalid, which blocks payment.

use serde::Serialize;

use crate::domain::signing::{SignatureCodec, SIGNATURE_FIELD};

use super::payer::Payer;
use super::session::InitialValues;

/// Outcome of reading a deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLink {
    pub initial: InitialValues,
    /// False only when a signature was checked and did not match.
    pub payload_valid: bool,
    /// True when a signature was present and actually checked.
    pub signature_checked: bool,
}

impl DeepLink {
    /// Reads query parameters, verifying them with `codec` when signed.
    pub fn from_query<I, K, V>(params: I, codec: &SignatureCodec) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let lookup = |key: &str| -> Option<String> {
            params
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
        };

        let initial = InitialValues {
            amount: lookup("amount"),
            currency: lookup("currency"),
            order_reference: lookup("order_reference"),
            customer_id: lookup("customer_id"),
            payer: Payer {
                name: lookup("full_name").unwrap_or_default(),
                email: lookup("email").unwrap_or_default(),
                address1: lookup("address1").unwrap_or_default(),
                address2: lookup("address2").unwrap_or_default(),
                city: lookup("city").unwrap_or_default(),
                postcode: lookup("postcode").unwrap_or_default(),
                country: lookup("country").unwrap_or_default(),
            },
        };

        let (payload_valid, signature_checked) = match lookup(SIGNATURE_FIELD) {
            Some(sig) if codec.is_configured() => {
                let valid = codec.verify_fields(params.iter().map(|(k, v)| (k, v)), &sig);
                if !valid {
                    tracing::warn!(
                        order_reference = initial.order_reference.as_deref().unwrap_or(""),
                        "Deep link signature mismatch"
                    );
                }
                (valid, true)
            }
            _ => (true, false),
        };

        Self {
            initial,
            payload_valid,
            signature_checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "link_secret";

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn signed_query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut q = query(pairs);
        let sig = SignatureCodec::new(SECRET)
            .sign_fields(q.iter().map(|(k, v)| (k, v)))
            .unwrap();
        q.push(("sig".to_string(), sig));
        q
    }

    #[test]
    fn maps_known_parameters() {
        let link = DeepLink::from_query(
            query(&[
                ("amount", "12.50"),
                ("currency", "GBP"),
                ("order_reference", "ORD-9"),
                ("full_name", "Ada Lovelace"),
                ("email", "ada@example.com"),
                ("address1", "1 Way"),
                ("address2", "Flat 2"),
                ("city", "London"),
                ("postcode", "N1"),
                ("country", "GB"),
                ("customer_id", "cus_1"),
            ]),
            &SignatureCodec::unconfigured(),
        );

        assert_eq!(link.initial.amount.as_deref(), Some("12.50"));
        assert_eq!(link.initial.order_reference.as_deref(), Some("ORD-9"));
        assert_eq!(link.initial.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(link.initial.payer.name, "Ada Lovelace");
        assert_eq!(link.initial.payer.address2, "Flat 2");
        assert!(link.payload_valid);
        assert!(!link.signature_checked);
    }

    #[test]
    fn valid_signature_passes() {
        let link = DeepLink::from_query(
            signed_query(&[("amount", "10.00"), ("order_reference", "ORD-1")]),
            &SignatureCodec::new(SECRET),
        );
        assert!(link.payload_valid);
        assert!(link.signature_checked);
    }

    #[test]
    fn tampered_amount_invalidates_payload() {
        let mut q = signed_query(&[("amount", "10.00"), ("order_reference", "ORD-1")]);
        q[0].1 = "0.01".to_string();

        let link = DeepLink::from_query(q, &SignatureCodec::new(SECRET));

        assert!(!link.payload_valid);
        assert_eq!(link.initial.amount.as_deref(), Some("0.01"));
    }

    #[test]
    fn unknown_parameters_are_covered_by_signature() {
        let mut q = signed_query(&[("amount", "10.00"), ("campaign", "spring")]);
        q[1].1 = "autumn".to_string();

        let link = DeepLink::from_query(q, &SignatureCodec::new(SECRET));
        assert!(!link.payload_valid);
    }

    #[test]
    fn unsigned_link_is_accepted_even_with_secret() {
        let link = DeepLink::from_query(query(&[("amount", "10.00")]), &SignatureCodec::new(SECRET));
        assert!(link.payload_valid);
        assert!(!link.signature_checked);
    }

    #[test]
    fn signature_without_secret_fails_open() {
        let link = DeepLink::from_query(
            query(&[("amount", "10.00"), ("sig", "bogus")]),
            &SignatureCodec::unconfigured(),
        );
        assert!(link.payload_valid);
        assert!(!link.signature_checked);
    }

    #[test]
    fn empty_values_are_treated_as_absent() {
        let link = DeepLink::from_query(
            query(&[("amount", ""), ("order_reference", "")]),
            &SignatureCodec::unconfigured(),
        );
        assert_eq!(link.initial.amount, None);
        assert_eq!(link.initial.order_reference, None);
    }
}

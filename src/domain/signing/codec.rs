//! HMAC-SHA256 signing for outbound webhook bodies and inbound deep links.
//!
//! Two payload shapes share one secret-handling policy:
//!
//! - **Bodies**: the raw bytes of a serialized webhook event.
//! - **Field sets**: string key/value pairs, canonicalized as
//!   `k1=v1&k2=v2` with keys sorted by byte order and the `sig` field dropped.
//!
//! # Unconfigured secret
//!
//! An empty secret never signs with an empty key. Signing returns `None`
//! (callers attach no header) and verification returns `true`. Callers that
//! need integrity must check [`SignatureCodec::is_configured`] themselves.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Name of the query field carrying a deep-link signature.
pub const SIGNATURE_FIELD: &str = "sig";

/// Builds the canonical string for a field set.
///
/// Keys are ordered by ordinal byte comparison; the `sig` field is excluded.
/// When a key appears more than once the last value wins.
pub fn canonicalize<I, K, V>(fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in fields {
        let key = key.as_ref();
        if key == SIGNATURE_FIELD {
            continue;
        }
        sorted.insert(key.to_string(), value.as_ref().to_string());
    }

    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signs and verifies payloads under a shared secret.
#[derive(Clone)]
pub struct SignatureCodec {
    secret: Option<SecretString>,
}

impl std::fmt::Debug for SignatureCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureCodec")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl SignatureCodec {
    /// Creates a codec. An empty secret leaves the codec unconfigured.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if secret.is_empty() {
            Self::unconfigured()
        } else {
            Self {
                secret: Some(SecretString::new(secret)),
            }
        }
    }

    /// Creates a codec from an optional secret.
    pub fn from_secret(secret: Option<&SecretString>) -> Self {
        match secret {
            Some(s) => Self::new(s.expose_secret().clone()),
            None => Self::unconfigured(),
        }
    }

    /// A codec with no secret: signing is skipped, verification passes.
    pub fn unconfigured() -> Self {
        Self { secret: None }
    }

    /// Whether a non-empty secret is present.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Lowercase hex HMAC of `body`, or `None` when unconfigured.
    pub fn sign_body(&self, body: &[u8]) -> Option<String> {
        let secret = self.secret.as_ref()?;
        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Lowercase hex HMAC of the canonical field string, or `None` when unconfigured.
    pub fn sign_fields<I, K, V>(&self, fields: I) -> Option<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.sign_body(canonicalize(fields).as_bytes())
    }

    /// Checks `supplied` against the HMAC of `body`.
    pub fn verify_body(&self, body: &[u8], supplied: &str) -> bool {
        if !self.is_configured() {
            tracing::debug!("No signing secret configured, accepting payload unverified");
            return true;
        }
        match self.sign_body(body) {
            Some(expected) => signatures_match(&expected, supplied),
            None => false,
        }
    }

    /// Checks `supplied` against the HMAC of the canonical field string.
    ///
    /// The `sig` field, if present in `fields`, is ignored.
    pub fn verify_fields<I, K, V>(&self, fields: I, supplied: &str) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.verify_body(canonicalize(fields).as_bytes(), supplied)
    }
}

/// Byte-exact comparison, constant time over equal-length inputs.
fn signatures_match(expected: &str, supplied: &str) -> bool {
    let a = expected.as_bytes();
    let b = supplied.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

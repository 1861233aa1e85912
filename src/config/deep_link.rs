//! Deep-link signing configuration

use secrecy::SecretString;
use serde::Deserialize;

use crate::domain::signing::SignatureCodec;

/// When a secret is set, a `sig` on the payment link is verified and a
/// mismatch blocks payment. Unsigned links are always accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeepLinkConfig {
    pub signing_secret: Option<SecretString>,
}

impl DeepLinkConfig {
    pub fn codec(&self) -> SignatureCodec {
        SignatureCodec::from_secret(self.signing_secret.as_ref())
    }
}

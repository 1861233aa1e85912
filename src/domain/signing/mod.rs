//! Payload signing shared by webhook delivery and deep-link verification.

mod codec;

pub use codec::{canonicalize, SignatureCodec, SIGNATURE_FIELD};

//! Seal derivation
//!
//! A seal is `SHA-256(subject || secret)`, rendered as 64 lowercase hex
//! characters. This is a shared-secret construction: anyone who knows the
//! secret can produce a valid seal for any content, and the verifier must
//! hold that same secret. It offers neither non-repudiation nor the
//! guarantees of a public-key signature.

use serde::{Deserialize, Serialize};

use super::error::{CryptoError, CryptoResult};
use super::hash::{check_digest_hex, Hash};
use super::secret::Secret;

/// The signature value carried in a payload
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(String);

impl Signature {
    /// Parse a hex signature
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        check_digest_hex(s)?;
        Ok(Signature(s.to_string()))
    }

    /// The hex string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Signature {
    type Error = CryptoError;

    fn try_from(s: String) -> CryptoResult<Self> {
        check_digest_hex(&s)?;
        Ok(Signature(s))
    }
}

impl From<Signature> for String {
    fn from(s: Signature) -> String {
        s.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", &self.0[..16])
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the seal for `subject` under `secret`
///
/// The subject is the raw text for text payloads, or the content hash hex
/// string for file payloads.
pub fn derive(subject: &str, secret: &Secret) -> Signature {
    let digest = Hash::hash_parts(&[subject.as_bytes(), secret.as_bytes()]);
    Signature(hex::encode(digest))
}

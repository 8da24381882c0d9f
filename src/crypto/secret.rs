//! Shared secrets
//!
//! The secret is the only key material in a seal. It never travels inside a
//! payload and has to reach the verifier out-of-band.

use rand::Rng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::{CryptoError, CryptoResult};

/// Prefix of generated secrets
pub const GENERATED_PREFIX: &str = "privkey_";

/// Number of random characters after the prefix
pub const GENERATED_LEN: usize = 24;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A shared secret string
///
/// The content is zeroized when dropped and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Wrap a user-supplied secret
    ///
    /// Empty and whitespace-only secrets are refused. The value itself is
    /// kept verbatim, surrounding whitespace included.
    pub fn new(value: impl Into<String>) -> CryptoResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            let mut value = value;
            value.zeroize();
            return Err(CryptoError::EmptySecret);
        }
        Ok(Secret(value))
    }

    /// Generate a fresh random secret
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut value = String::with_capacity(GENERATED_PREFIX.len() + GENERATED_LEN);
        value.push_str(GENERATED_PREFIX);
        for _ in 0..GENERATED_LEN {
            value.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
        }
        Secret(value)
    }

    /// Expose the secret
    ///
    /// # Security Warning
    /// Never log or persist the returned value without the user asking for it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Raw UTF-8 bytes of the secret
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl std::str::FromStr for Secret {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<Self> {
        Secret::new(s)
    }
}

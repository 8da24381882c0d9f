//! Cryptographic error types

use thiserror::Error;

/// Errors that can occur while hashing content or handling secrets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The secret is empty or whitespace-only
    #[error("Secret must not be empty")]
    EmptySecret,

    /// A digest string does not have the expected shape
    #[error("Invalid digest: expected {expected} hex characters, got {actual:?}")]
    InvalidDigest {
        /// Expected number of hex characters
        expected: usize,
        /// The offending value
        actual: String,
    },

    /// File content could not be read
    #[error("Failed to read file content: {0}")]
    ReadFailed(String),

    /// The digest computation did not complete
    #[error("Digest computation failed: {0}")]
    DigestFailed(String),
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

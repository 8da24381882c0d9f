//! Cryptographic primitives for qrseal
//!
//! This module provides the building blocks shared by signer and verifier:
//! - `hash`: SHA-256 hashing and file content digests
//! - `secret`: shared secrets (zeroized, never serialized)
//! - `derive`: seal derivation from subject + secret

pub mod derive;
pub mod error;
pub mod hash;
pub mod secret;

// Re-export commonly used types
pub use derive::{derive, Signature};
pub use error::{CryptoError, CryptoResult};
pub use hash::{ContentHash, Hash, HASH_HEX_LEN};
pub use secret::Secret;

//! SHA-256 hashing and content digests
//!
//! The digest primitive behind both file content hashing and seal derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{CryptoError, CryptoResult};

/// Size of a hash output in bytes
pub const HASH_SIZE: usize = 32;

/// Length of a hex-encoded hash
pub const HASH_HEX_LEN: usize = HASH_SIZE * 2;

/// A hash output
pub type HashOutput = [u8; HASH_SIZE];

/// Hashing operations
pub struct Hash;

impl Hash {
    /// Compute hash of data
    pub fn hash(data: &[u8]) -> HashOutput {
        Sha256::digest(data).into()
    }

    /// Compute hash over several chunks as if they were concatenated
    pub fn hash_parts(parts: &[&[u8]]) -> HashOutput {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }

    /// Compute hash and return as lowercase hex string
    pub fn hash_hex(data: &[u8]) -> String {
        hex::encode(Self::hash(data))
    }

    /// Hash file content on the blocking pool
    ///
    /// Large files would otherwise stall the runtime thread that owns the
    /// triggering action.
    pub async fn content_hash(bytes: Vec<u8>) -> CryptoResult<ContentHash> {
        tokio::task::spawn_blocking(move || ContentHash::of(&bytes))
            .await
            .map_err(|e| CryptoError::DigestFailed(e.to_string()))
    }
}

/// Check that `s` is a full-length hex digest
pub(crate) fn check_digest_hex(s: &str) -> CryptoResult<()> {
    if s.len() == HASH_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(CryptoError::InvalidDigest {
            expected: HASH_HEX_LEN,
            actual: s.to_string(),
        })
    }
}

/// Hex-encoded SHA-256 of a file's content
///
/// Values built locally are always lowercase. Values read off the wire keep
/// their original spelling so that comparisons stay exact.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw file content
    pub fn of(content: &[u8]) -> Self {
        ContentHash(Hash::hash_hex(content))
    }

    /// Parse a hex digest
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        check_digest_hex(s)?;
        Ok(ContentHash(s.to_string()))
    }

    /// The hex string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentHash {
    type Error = CryptoError;

    fn try_from(s: String) -> CryptoResult<Self> {
        check_digest_hex(&s)?;
        Ok(ContentHash(s))
    }
}

impl From<ContentHash> for String {
    fn from(h: ContentHash) -> String {
        h.0
    }
}

impl std::fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentHash({}...)", &self.0[..16])
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let data = b"Hello, qrseal!";
        let h1 = Hash::hash(data);
        let h2 = Hash::hash(data);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hash_different_inputs() {
        let h1 = Hash::hash(b"input1");
        let h2 = Hash::hash(b"input2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            Hash::hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_parts_matches_concatenation() {
        assert_eq!(Hash::hash_parts(&[b"hel", b"lo"]), Hash::hash(b"hello"));
    }

    #[test]
    fn test_content_hash_shape() {
        let h = ContentHash::of(b"0123456789");
        assert_eq!(h.as_str().len(), HASH_HEX_LEN);
        assert!(h.as_str().bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_from_hex_rejects_bad_values() {
        assert!(ContentHash::from_hex("abc").is_err());
        assert!(ContentHash::from_hex(&"g".repeat(HASH_HEX_LEN)).is_err());
        assert!(ContentHash::from_hex(&"a".repeat(HASH_HEX_LEN)).is_ok());
    }

    #[tokio::test]
    async fn test_content_hash_on_blocking_pool() {
        let hash = Hash::content_hash(b"file body".to_vec()).await.unwrap();
        assert_eq!(hash, ContentHash::of(b"file body"));
    }
}

//! Payload building
//!
//! A payload is the self-describing record carried inside a code:
//!
//! ```text
//! {"type":"text","data":"hello","signature":"<64 hex>"}
//! {"type":"file","name":"abc.pdf","hash":"<64 hex>","signature":"<64 hex>"}
//! ```
//!
//! # Example
//!
//! ```rust
//! use qrseal::crypto::{derive, Secret};
//! use qrseal::payload::{build, ContentDescriptor};
//!
//! let secret = Secret::new("k1").unwrap();
//! let payload = build(&ContentDescriptor::text("hello"), secret.expose()).unwrap();
//!
//! assert_eq!(payload.signature(), &derive("hello", &secret));
//! assert!(!payload.to_json().contains("k1"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{derive, ContentHash, Secret, Signature};

/// Reasons a payload cannot be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Text content is empty or whitespace-only
    #[error("Text data must not be empty")]
    EmptyText,

    /// A file was chosen but its hash has not been computed yet
    #[error("No file hash available; select a file and wait for hashing to finish")]
    HashPending,

    /// The secret is empty or whitespace-only
    #[error("Secret must not be empty")]
    EmptySecret,
}

/// Result type for payload building
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Payload discriminant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// Inline text
    Text,
    /// A file referenced by name and content hash
    File,
}

impl PayloadKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
            PayloadKind::File => "file",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is being sealed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentDescriptor {
    /// Inline text
    Text {
        /// The text itself
        data: String,
    },
    /// A file by name and content hash
    File {
        /// File name as selected by the signer
        name: String,
        /// Content hash, `None` while hashing is still running
        hash: Option<ContentHash>,
    },
}

impl ContentDescriptor {
    /// Describe inline text
    pub fn text(data: impl Into<String>) -> Self {
        ContentDescriptor::Text { data: data.into() }
    }

    /// Describe a hashed file
    pub fn file(name: impl Into<String>, hash: ContentHash) -> Self {
        ContentDescriptor::File {
            name: name.into(),
            hash: Some(hash),
        }
    }

    /// Kind of payload this descriptor produces
    pub fn kind(&self) -> PayloadKind {
        match self {
            ContentDescriptor::Text { .. } => PayloadKind::Text,
            ContentDescriptor::File { .. } => PayloadKind::File,
        }
    }
}

/// The signed record exchanged through a code
///
/// Immutable once built; the secret is never part of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignedPayload {
    /// Sealed inline text
    Text {
        /// The text that was sealed
        data: String,
        /// Seal over `data`
        signature: Signature,
    },
    /// Sealed file reference
    File {
        /// Name of the sealed file
        name: String,
        /// Content hash of the sealed file
        hash: ContentHash,
        /// Seal over `hash`
        signature: Signature,
    },
}

impl SignedPayload {
    /// Payload kind
    pub fn kind(&self) -> PayloadKind {
        match self {
            SignedPayload::Text { .. } => PayloadKind::Text,
            SignedPayload::File { .. } => PayloadKind::File,
        }
    }

    /// The seal
    pub fn signature(&self) -> &Signature {
        match self {
            SignedPayload::Text { signature, .. } | SignedPayload::File { signature, .. } => {
                signature
            }
        }
    }

    /// The string that was combined with the secret
    pub fn subject(&self) -> &str {
        match self {
            SignedPayload::Text { data, .. } => data,
            SignedPayload::File { hash, .. } => hash.as_str(),
        }
    }

    /// Serialize to the wire JSON
    pub fn to_json(&self) -> String {
        // Every field is a plain string, so this cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Build a signed payload
///
/// Content is checked before the secret, then the subject is sealed and the
/// record assembled.
pub fn build(descriptor: &ContentDescriptor, secret: &str) -> PayloadResult<SignedPayload> {
    match descriptor {
        ContentDescriptor::Text { data } if data.trim().is_empty() => {
            return Err(PayloadError::EmptyText)
        }
        ContentDescriptor::File { hash: None, .. } => return Err(PayloadError::HashPending),
        _ => {}
    }

    let secret = Secret::new(secret).map_err(|_| PayloadError::EmptySecret)?;
    build_with(descriptor, &secret)
}

/// Build a signed payload with an already validated secret
pub fn build_with(descriptor: &ContentDescriptor, secret: &Secret) -> PayloadResult<SignedPayload> {
    let payload = match descriptor {
        ContentDescriptor::Text { data } => {
            if data.trim().is_empty() {
                return Err(PayloadError::EmptyText);
            }
            SignedPayload::Text {
                data: data.clone(),
                signature: derive(data, secret),
            }
        }
        ContentDescriptor::File { name, hash } => {
            let hash = hash.as_ref().ok_or(PayloadError::HashPending)?;
            SignedPayload::File {
                name: name.clone(),
                hash: hash.clone(),
                signature: derive(hash.as_str(), secret),
            }
        }
    };

    tracing::debug!(kind = %payload.kind(), "payload sealed");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Hash;

    #[test]
    fn test_build_text() {
        let payload = build(&ContentDescriptor::text("hello"), "k1").unwrap();
        assert_eq!(payload.kind(), PayloadKind::Text);
        assert_eq!(payload.subject(), "hello");
        assert_eq!(payload.signature().as_str(), Hash::hash_hex(b"hellok1"));
    }

    #[test]
    fn test_build_file_signs_hash_not_bytes() {
        let content = b"0123456789";
        let hash = ContentHash::of(content);
        let payload = build(&ContentDescriptor::file("abc.pdf", hash.clone()), "k1").unwrap();

        let mut expected = hash.as_str().as_bytes().to_vec();
        expected.extend_from_slice(b"k1");
        assert_eq!(payload.signature().as_str(), Hash::hash_hex(&expected));

        match payload {
            SignedPayload::File { name, hash: h, .. } => {
                assert_eq!(name, "abc.pdf");
                assert_eq!(h, hash);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let a = build(&ContentDescriptor::text(" hello"), "k1").unwrap();
        let b = build(&ContentDescriptor::text("hello"), "k1").unwrap();
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            build(&ContentDescriptor::text("   "), "k1").unwrap_err(),
            PayloadError::EmptyText
        );
        let pending = ContentDescriptor::File {
            name: "abc.pdf".into(),
            hash: None,
        };
        assert_eq!(build(&pending, "k1").unwrap_err(), PayloadError::HashPending);
        assert_eq!(
            build(&ContentDescriptor::text("hello"), " ").unwrap_err(),
            PayloadError::EmptySecret
        );
    }

    #[test]
    fn test_content_checked_before_secret() {
        assert_eq!(
            build(&ContentDescriptor::text(""), "").unwrap_err(),
            PayloadError::EmptyText
        );
    }

    #[test]
    fn test_wire_shape_text() {
        let payload = build(&ContentDescriptor::text("hello"), "k1").unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["data"], "hello");
        assert_eq!(value["signature"], Hash::hash_hex(b"hellok1"));
        assert!(value.get("name").is_none());
        assert!(value.get("hash").is_none());
    }

    #[test]
    fn test_wire_shape_file() {
        let hash = ContentHash::of(b"bytes");
        let payload = build(&ContentDescriptor::file("a.pdf", hash.clone()), "k1").unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["name"], "a.pdf");
        assert_eq!(value["hash"], hash.as_str());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_secret_never_serialized() {
        let secrets = ["k1", "privkey_abc", "hello", "a long secret with spaces"];
        for secret in secrets {
            let text = build(&ContentDescriptor::text("some content"), secret).unwrap();
            assert!(!text.to_json().contains(secret));

            let file = build(&ContentDescriptor::file("f.pdf", ContentHash::of(b"x")), secret)
                .unwrap();
            assert!(!file.to_json().contains(secret));
        }
    }
}

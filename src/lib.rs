//! # qrseal
//!
//! Seal text or files with a shared secret and carry the seal inside a
//! scannable code.
//!
//! ## Features
//!
//! - **Text and file seals**: files are sealed by their SHA-256 content hash
//! - **Self-describing payloads** in a small JSON record, parsed by field name
//! - **Pluggable optical codecs** (in-memory, armored text, external renderers)
//! - **Verification state machine** that tells a failed check apart from a
//!   check that could not run
//!
//! ## Security model
//!
//! A seal is `SHA-256(subject || secret)`. Signer and verifier share the same
//! secret, which must travel out-of-band. This is **not** a public-key
//! signature: whoever can verify a seal can also forge one, and the seal
//! proves nothing about who produced it.
//!
//! ## Quick Start
//!
//! ```rust
//! use qrseal::payload::{build, ContentDescriptor};
//! use qrseal::verify::{VerificationOutcome, Verifier};
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let payload = build(&ContentDescriptor::text("hello"), "k1").unwrap();
//!
//! let mut verifier = Verifier::new();
//! verifier.load_text(&payload.to_json()).unwrap();
//! assert_eq!(verifier.verify("k1").await.unwrap(), VerificationOutcome::Accepted);
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!        SIGNER                                     VERIFIER
//! ┌──────────────────┐                      ┌──────────────────────┐
//! │  SigningSession  │                      │  Verifier (states)   │
//! │ secret, text,    │                      │ payload, secret,     │
//! │ file + hash      │                      │ resubmitted file     │
//! └────────┬─────────┘                      └──────────▲───────────┘
//!          │ build                                     │ decode
//! ┌────────▼─────────┐   image (QR, armor)  ┌──────────┴───────────┐
//! │  SignedPayload   ├─────────────────────►│   OpticalCodec       │
//! └────────┬─────────┘                      └──────────────────────┘
//!          │
//! ┌────────▼─────────────────────────────────────────────────────┐
//! │           CRYPTO: SHA-256 | derive(subject, secret)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod crypto;
pub mod payload;
pub mod session;
pub mod transport;
pub mod verify;

// Re-export main types at crate root
pub use crypto::{derive, ContentHash, CryptoError, CryptoResult, Secret, Signature};
pub use payload::{build, ContentDescriptor, PayloadError, PayloadKind, SignedPayload};
pub use session::{DiskFile, FileSource, MemoryFile, SignMode, SigningSession};
pub use transport::{DecodeFailure, ErrorCorrection, Image, OpticalCodec};
pub use verify::{Rejection, VerificationOutcome, Verifier, VerifierState, VerifyError};

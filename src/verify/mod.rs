//! Verification state machine
//!
//! ```text
//! AwaitingPayload --decode ok--> AwaitingSecretOrFile --verify--> Verifying
//!       ^    |                          ^      |                     |
//!       |    +--decode failed (stay)    |      +--missing input      v
//!       |                               +----------retry------ Accepted
//!       +-----------------------reset------------------------- Rejected(reason)
//!                                                              Error(reason)
//! ```
//!
//! `Rejected` means verification ran and the content or seal did not match.
//! `Error` means verification could not run to completion, e.g. the
//! resubmitted file could not be read.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::crypto::{derive, ContentHash, CryptoResult, Secret};
use crate::payload::SignedPayload;
use crate::session::FileSource;
use crate::transport::{self, DecodeResult, Image, OpticalCodec};

/// Why a verification was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The recomputed seal differs, most likely a wrong secret
    SignatureMismatch,
    /// The resubmitted file's content differs from the sealed hash
    ContentMismatch,
    /// The resubmitted file's name differs from the sealed name
    FileNameMismatch,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Rejection::SignatureMismatch => "signature mismatch (the secret may be wrong)",
            Rejection::ContentMismatch => "file content was modified (hash mismatch)",
            Rejection::FileNameMismatch => "file name does not match",
        };
        f.write_str(text)
    }
}

/// Verifier states
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifierState {
    /// No payload loaded yet
    AwaitingPayload,
    /// Payload loaded, waiting for the secret and, for files, the file
    AwaitingSecretOrFile,
    /// Verification in progress
    Verifying,
    /// Seal and content matched
    Accepted,
    /// Verification ran and failed
    Rejected(Rejection),
    /// Verification could not be completed
    Error(String),
}

impl VerifierState {
    /// Whether this is a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VerifierState::Accepted | VerifierState::Rejected(_) | VerifierState::Error(_)
        )
    }
}

/// Flattened view of where verification stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Not verified yet
    Pending,
    /// Verified
    Accepted,
    /// Wrong seal
    RejectedSignatureMismatch,
    /// Tampered file content
    RejectedContentMismatch,
    /// Different file name
    RejectedFileNameMismatch,
    /// Could not verify
    Error(String),
}

impl From<&VerifierState> for VerificationOutcome {
    fn from(state: &VerifierState) -> Self {
        match state {
            VerifierState::AwaitingPayload
            | VerifierState::AwaitingSecretOrFile
            | VerifierState::Verifying => VerificationOutcome::Pending,
            VerifierState::Accepted => VerificationOutcome::Accepted,
            VerifierState::Rejected(Rejection::SignatureMismatch) => {
                VerificationOutcome::RejectedSignatureMismatch
            }
            VerifierState::Rejected(Rejection::ContentMismatch) => {
                VerificationOutcome::RejectedContentMismatch
            }
            VerifierState::Rejected(Rejection::FileNameMismatch) => {
                VerificationOutcome::RejectedFileNameMismatch
            }
            VerifierState::Error(reason) => VerificationOutcome::Error(reason.clone()),
        }
    }
}

/// Requests the verifier cannot act on in its current state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Nothing has been decoded yet
    #[error("No payload loaded; load a code first")]
    NoPayload,

    /// The secret is empty or whitespace-only
    #[error("Missing input: secret must not be empty")]
    MissingSecret,

    /// A file payload was loaded but no file was resubmitted
    #[error("Missing input: upload the original file `{0}` to verify it")]
    MissingFile(String),

    /// The previous run ended; call `retry` or `reset` first
    #[error("Verification already finished")]
    Finished,
}

impl VerifyError {
    /// Whether the user only needs to provide more input
    pub fn is_missing_input(&self) -> bool {
        matches!(self, VerifyError::MissingSecret | VerifyError::MissingFile(_))
    }
}

/// Result type for verifier requests
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Verifier-side session
pub struct Verifier {
    state: VerifierState,
    payload: Option<SignedPayload>,
    file: Option<Box<dyn FileSource>>,
}

impl Verifier {
    /// Create a verifier awaiting a payload
    pub fn new() -> Self {
        Verifier {
            state: VerifierState::AwaitingPayload,
            payload: None,
            file: None,
        }
    }

    /// Current state
    pub fn state(&self) -> &VerifierState {
        &self.state
    }

    /// Outcome view of the current state
    pub fn outcome(&self) -> VerificationOutcome {
        VerificationOutcome::from(&self.state)
    }

    /// The loaded payload
    pub fn payload(&self) -> Option<&SignedPayload> {
        self.payload.as_ref()
    }

    /// Name of the resubmitted file
    pub fn supplied_file(&self) -> Option<&str> {
        self.file.as_deref().map(|f| f.name())
    }

    /// Back to `AwaitingPayload`, forgetting payload and file
    pub fn reset(&mut self) {
        self.state = VerifierState::AwaitingPayload;
        self.payload = None;
        self.file = None;
    }

    /// Back from a final state to `AwaitingSecretOrFile`, keeping the payload
    pub fn retry(&mut self) -> VerifyResult<()> {
        if self.payload.is_none() {
            return Err(VerifyError::NoPayload);
        }
        self.state = VerifierState::AwaitingSecretOrFile;
        Ok(())
    }

    /// Decode an image and load its payload
    ///
    /// The verifier is reset first. On failure it stays in `AwaitingPayload`.
    pub async fn load_image<C>(&mut self, codec: &C, image: &Image) -> DecodeResult<&SignedPayload>
    where
        C: OpticalCodec + ?Sized,
    {
        self.reset();
        match transport::decode_payload(codec, image).await {
            Ok(payload) => Ok(self.load_payload(payload)),
            Err(e) => {
                warn!(error = %e, "could not load payload from image");
                Err(e)
            }
        }
    }

    /// Parse payload text and load it
    pub fn load_text(&mut self, text: &str) -> DecodeResult<&SignedPayload> {
        self.reset();
        let payload = transport::parse_payload(text)?;
        Ok(self.load_payload(payload))
    }

    /// Load an already decoded payload
    pub fn load_payload(&mut self, payload: SignedPayload) -> &SignedPayload {
        self.reset();
        debug!(kind = %payload.kind(), "payload loaded");
        self.state = VerifierState::AwaitingSecretOrFile;
        self.payload.insert(payload)
    }

    /// Resubmit the file to check against a file payload
    ///
    /// Replaces any earlier file. Ignored by text payloads.
    pub fn supply_file<F>(&mut self, file: F) -> VerifyResult<()>
    where
        F: FileSource + 'static,
    {
        if self.payload.is_none() {
            return Err(VerifyError::NoPayload);
        }
        self.file = Some(Box::new(file));
        Ok(())
    }

    /// Run verification with the given secret
    ///
    /// Input problems are returned as errors and leave the state untouched.
    /// Otherwise the machine moves to a final state, which is also returned.
    /// A run that was dropped before finishing can simply be started again.
    pub async fn verify(&mut self, secret: &str) -> VerifyResult<VerificationOutcome> {
        match self.state {
            VerifierState::AwaitingPayload => return Err(VerifyError::NoPayload),
            VerifierState::AwaitingSecretOrFile | VerifierState::Verifying => {}
            _ => return Err(VerifyError::Finished),
        }
        let payload = self.payload.as_ref().ok_or(VerifyError::NoPayload)?;

        let secret = Secret::new(secret).map_err(|_| VerifyError::MissingSecret)?;
        let resubmitted = match payload {
            SignedPayload::File { name, hash, .. } => {
                let file = self
                    .file
                    .as_deref()
                    .ok_or_else(|| VerifyError::MissingFile(name.clone()))?;
                Some((file, name.as_str(), hash))
            }
            SignedPayload::Text { .. } => None,
        };

        self.state = VerifierState::Verifying;
        let checked = match resubmitted {
            Some((file, name, hash)) => check_file(file, name, hash).await,
            None => Ok(None),
        };
        let next = match checked {
            Ok(Some(rejection)) => VerifierState::Rejected(rejection),
            Ok(None) if derive(payload.subject(), &secret) == *payload.signature() => {
                VerifierState::Accepted
            }
            Ok(None) => VerifierState::Rejected(Rejection::SignatureMismatch),
            Err(e) => {
                warn!(error = %e, "verification could not complete");
                VerifierState::Error(format!("Verification could not be completed: {e}"))
            }
        };

        info!(kind = %payload.kind(), state = ?next, "verification finished");
        self.state = next;
        Ok(self.outcome())
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare a resubmitted file against the sealed name and hash
///
/// The name is checked before anything is read, and content before the seal,
/// so the most specific failure is reported.
async fn check_file(
    file: &dyn FileSource,
    name: &str,
    hash: &ContentHash,
) -> CryptoResult<Option<Rejection>> {
    if file.name() != name {
        return Ok(Some(Rejection::FileNameMismatch));
    }
    if file.content_hash().await? != *hash {
        return Ok(Some(Rejection::ContentMismatch));
    }
    Ok(None)
}

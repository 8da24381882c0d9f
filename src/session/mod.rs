//! Signing sessions
//!
//! A `SigningSession` owns everything the signer has entered: the secret,
//! the sign mode, the text, and the currently selected file with its cached
//! content hash. Nothing is shared between sessions and nothing outlives one.
//!
//! # File selection
//!
//! Hashing a file suspends. If the user picks another file meanwhile, the
//! older computation must not overwrite the newer selection. Every selection
//! hands out a `HashTicket`; a result is applied only when its ticket still
//! names the current selection.

mod file;

pub use file::{DiskFile, FileSource, MemoryFile};

use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::{ContentHash, CryptoResult, Secret};
use crate::payload::{self, ContentDescriptor, PayloadError, SignedPayload};
use crate::transport::{self, Image, OpticalCodec, TransportError};

/// Errors raised while producing a code
#[derive(Error, Debug)]
pub enum SessionError {
    /// The inputs do not form a valid payload
    #[error(transparent)]
    InvalidInput(#[from] PayloadError),

    /// The codec failed to render the payload
    #[error(transparent)]
    Encode(#[from] TransportError),
}

/// What the signer is sealing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignMode {
    /// Inline text
    #[default]
    Text,
    /// A selected file
    File,
}

/// Identifies one file selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashTicket {
    generation: u64,
}

#[derive(Debug)]
struct FileSelection {
    name: String,
    hash: Option<ContentHash>,
}

/// Signer-side session state
pub struct SigningSession {
    secret: Zeroizing<String>,
    mode: SignMode,
    text: String,
    selection: Option<FileSelection>,
    generation: u64,
    image: Option<Image>,
}

impl SigningSession {
    /// Start a session with a freshly generated secret
    pub fn new() -> Self {
        let secret = Secret::generate();
        Self::with_secret(secret.expose())
    }

    /// Start a session with a chosen secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        SigningSession {
            secret: Zeroizing::new(secret.into()),
            mode: SignMode::Text,
            text: String::new(),
            selection: None,
            generation: 0,
            image: None,
        }
    }

    /// Current secret as entered, possibly empty
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Replace the secret
    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = Zeroizing::new(secret.into());
    }

    /// Replace the secret with a generated one and return it
    pub fn regenerate_secret(&mut self) -> &str {
        let fresh = Secret::generate();
        self.set_secret(fresh.expose());
        &self.secret
    }

    /// Current sign mode
    pub fn mode(&self) -> SignMode {
        self.mode
    }

    /// Switch between text and file
    pub fn set_mode(&mut self, mode: SignMode) {
        self.mode = mode;
    }

    /// Replace the text to seal
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Name of the selected file
    pub fn selected_file(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.name.as_str())
    }

    /// Cached hash of the selected file, once computed
    pub fn file_hash(&self) -> Option<&ContentHash> {
        self.selection.as_ref().and_then(|s| s.hash.as_ref())
    }

    /// Record a new file selection
    ///
    /// Any earlier hash, finished or not, is forgotten.
    pub fn begin_file_selection(&mut self, name: impl Into<String>) -> HashTicket {
        self.generation += 1;
        self.selection = Some(FileSelection {
            name: name.into(),
            hash: None,
        });
        debug!(generation = self.generation, "file selected");
        HashTicket {
            generation: self.generation,
        }
    }

    /// Apply the outcome of a hash computation
    ///
    /// Returns `Ok(false)` when the ticket is stale and the result was
    /// discarded. A failed computation leaves the selection without a hash.
    pub fn complete_hash(
        &mut self,
        ticket: HashTicket,
        result: CryptoResult<ContentHash>,
    ) -> CryptoResult<bool> {
        if ticket.generation != self.generation {
            warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding hash for superseded file selection"
            );
            return Ok(false);
        }

        let hash = result?;
        if let Some(selection) = self.selection.as_mut() {
            debug!(file = %selection.name, "file hash ready");
            selection.hash = Some(hash);
        }
        Ok(true)
    }

    /// Select a file and hash it
    pub async fn select_file<F>(&mut self, file: &F) -> CryptoResult<()>
    where
        F: FileSource + ?Sized,
    {
        let ticket = self.begin_file_selection(file.name());
        let result = file.content_hash().await;
        self.complete_hash(ticket, result).map(|_| ())
    }

    /// Content descriptor for the current mode
    pub fn descriptor(&self) -> ContentDescriptor {
        match self.mode {
            SignMode::Text => ContentDescriptor::text(self.text.clone()),
            SignMode::File => ContentDescriptor::File {
                name: self
                    .selection
                    .as_ref()
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                hash: self.file_hash().cloned(),
            },
        }
    }

    /// Build the signed payload from the current inputs
    pub fn seal(&self) -> Result<SignedPayload, PayloadError> {
        payload::build(&self.descriptor(), &self.secret)
    }

    /// Build the payload and render it
    ///
    /// The previous image is dropped first, so a failure leaves none.
    pub async fn render<C>(&mut self, codec: &C) -> Result<&Image, SessionError>
    where
        C: OpticalCodec + ?Sized,
    {
        self.image = None;
        let payload = self.seal()?;
        let image = transport::encode_payload(codec, &payload).await?;
        Ok(self.image.insert(image))
    }

    /// Last rendered image
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }
}

impl Default for SigningSession {
    fn default() -> Self {
        Self::new()
    }
}

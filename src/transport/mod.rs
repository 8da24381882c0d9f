//! Optical transport
//!
//! Moves a `SignedPayload` in and out of a scannable image. Rendering and
//! recognizing the optical pattern is delegated to an `OpticalCodec`; this
//! module owns the text encoding and the structural checks on the way back.
//!
//! Codecs provided here:
//! - In-memory images (for testing)
//! - Armored text blocks for copy-paste or piping into an external renderer

use async_trait::async_trait;
use thiserror::Error;

use crate::payload::SignedPayload;

pub mod armor;
pub use armor::ArmoredCodec;

/// Error-correction tier requested from the codec
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCorrection {
    /// ~7% recovery
    Low,
    /// ~15% recovery
    Medium,
    /// ~25% recovery
    Quartile,
    /// ~30% recovery
    High,
}

impl ErrorCorrection {
    /// Tier used for every payload: printed and photographed codes degrade
    pub const PAYLOAD: ErrorCorrection = ErrorCorrection::High;

    /// Single-letter code for the tier
    pub fn as_char(&self) -> char {
        match self {
            ErrorCorrection::Low => 'L',
            ErrorCorrection::Medium => 'M',
            ErrorCorrection::Quartile => 'Q',
            ErrorCorrection::High => 'H',
        }
    }

    /// Parse a single-letter tier code
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(ErrorCorrection::Low),
            'M' => Some(ErrorCorrection::Medium),
            'Q' => Some(ErrorCorrection::Quartile),
            'H' => Some(ErrorCorrection::High),
            _ => None,
        }
    }
}

/// An encoded image, opaque to everything except its codec
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image(pub Vec<u8>);

impl Image {
    /// Raw image bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encoding errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// The codec could not render the text
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
}

/// Result type for encoding
pub type TransportResult<T> = Result<T, TransportError>;

/// Reasons a scanned image did not yield a payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// No code was recognized in the image
    #[error("No code found in image")]
    NoCode,

    /// A required field is absent
    #[error("Malformed payload: missing field `{0}`")]
    MissingField(&'static str),

    /// The recovered text is not a valid payload
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// Result type for decoding
pub type DecodeResult<T> = Result<T, DecodeFailure>;

/// The encode/decode collaborator
///
/// Implementations render text into an image and recover it again. They know
/// nothing about payloads.
#[async_trait]
pub trait OpticalCodec: Send + Sync {
    /// Render `text` at the given error-correction tier
    async fn encode(&self, text: &str, level: ErrorCorrection) -> TransportResult<Image>;

    /// Recover text from an image, `None` if no code is recognized
    async fn decode(&self, image: &Image) -> Option<String>;
}

/// Serialize a payload and render it
pub async fn encode_payload<C>(codec: &C, payload: &SignedPayload) -> TransportResult<Image>
where
    C: OpticalCodec + ?Sized,
{
    codec.encode(&payload.to_json(), ErrorCorrection::PAYLOAD).await
}

/// Recognize an image and parse the payload it carries
pub async fn decode_payload<C>(codec: &C, image: &Image) -> DecodeResult<SignedPayload>
where
    C: OpticalCodec + ?Sized,
{
    let text = codec.decode(image).await.ok_or(DecodeFailure::NoCode)?;
    parse_payload(&text)
}

/// Parse payload text by field name
///
/// `type` and `signature` are checked first; their absence is reported
/// before anything else is looked at.
pub fn parse_payload(text: &str) -> DecodeResult<SignedPayload> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DecodeFailure::Malformed(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| DecodeFailure::Malformed("expected a JSON object".to_string()))?;

    for field in ["type", "signature"] {
        match object.get(field) {
            None | Some(serde_json::Value::Null) => return Err(DecodeFailure::MissingField(field)),
            Some(_) => {}
        }
    }

    serde_json::from_value(value).map_err(|e| DecodeFailure::Malformed(e.to_string()))
}

/// In-memory codec for testing
///
/// The image is the tier letter followed by the UTF-8 text.
pub mod memory {
    use super::*;

    /// Codec that stores text verbatim
    #[derive(Default)]
    pub struct MemoryCodec;

    impl MemoryCodec {
        /// Create a new memory codec
        pub fn new() -> Self {
            MemoryCodec
        }

        /// An image in which no code can be found
        pub fn blank_image() -> Image {
            Image(Vec::new())
        }

        /// An image carrying arbitrary text, bypassing payload serialization
        pub fn image_of(text: &str) -> Image {
            let mut bytes = vec![ErrorCorrection::PAYLOAD.as_char() as u8];
            bytes.extend_from_slice(text.as_bytes());
            Image(bytes)
        }

        /// Tier an image was encoded with
        pub fn level_of(image: &Image) -> Option<ErrorCorrection> {
            image
                .as_bytes()
                .first()
                .and_then(|b| ErrorCorrection::from_char(*b as char))
        }
    }

    #[async_trait]
    impl OpticalCodec for MemoryCodec {
        async fn encode(&self, text: &str, level: ErrorCorrection) -> TransportResult<Image> {
            let mut bytes = Vec::with_capacity(text.len() + 1);
            bytes.push(level.as_char() as u8);
            bytes.extend_from_slice(text.as_bytes());
            Ok(Image(bytes))
        }

        async fn decode(&self, image: &Image) -> Option<String> {
            let (tag, rest) = image.as_bytes().split_first()?;
            ErrorCorrection::from_char(*tag as char)?;
            String::from_utf8(rest.to_vec()).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryCodec;
    use super::*;
    use crate::crypto::ContentHash;
    use crate::payload::{build, ContentDescriptor};

    const SIG: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[tokio::test]
    async fn test_round_trip_text() {
        let codec = MemoryCodec::new();
        let payload = build(&ContentDescriptor::text("hello"), "k1").unwrap();

        let image = encode_payload(&codec, &payload).await.unwrap();
        assert_eq!(MemoryCodec::level_of(&image), Some(ErrorCorrection::High));

        let decoded = decode_payload(&codec, &image).await.unwrap();
        assert_eq!(decoded, payload);
    }

    #[tokio::test]
    async fn test_round_trip_file() {
        let codec = MemoryCodec::new();
        let descriptor = ContentDescriptor::file("report.pdf", ContentHash::of(b"report"));
        let payload = build(&descriptor, "k1").unwrap();

        let image = encode_payload(&codec, &payload).await.unwrap();
        assert_eq!(decode_payload(&codec, &image).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_no_code_found() {
        let codec = MemoryCodec::new();
        let err = decode_payload(&codec, &MemoryCodec::blank_image())
            .await
            .unwrap_err();
        assert_eq!(err, DecodeFailure::NoCode);
    }

    #[test]
    fn test_field_order_not_load_bearing() {
        let text = format!(r#"{{"signature":"{SIG}","data":"hello","type":"text"}}"#);
        let payload = parse_payload(&text).unwrap();
        assert_eq!(payload.subject(), "hello");
        assert_eq!(payload.signature().as_str(), SIG);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let text = format!(r#"{{"type":"text","data":"hi","signature":"{SIG}","extra":1}}"#);
        assert!(parse_payload(&text).is_ok());
    }

    #[test]
    fn test_missing_type_is_structural() {
        let text = format!(r#"{{"data":"hello","signature":"{SIG}"}}"#);
        assert_eq!(
            parse_payload(&text).unwrap_err(),
            DecodeFailure::MissingField("type")
        );
    }

    #[test]
    fn test_missing_signature_is_structural() {
        let text = r#"{"type":"text","data":"hello"}"#;
        assert_eq!(
            parse_payload(text).unwrap_err(),
            DecodeFailure::MissingField("signature")
        );
    }

    #[test]
    fn test_malformed_payloads() {
        let cases = [
            "not json".to_string(),
            "[1,2,3]".to_string(),
            format!(r#"{{"type":"video","data":"x","signature":"{SIG}"}}"#),
            format!(r#"{{"type":"text","signature":"{SIG}"}}"#),
            format!(r#"{{"type":"file","name":"a.pdf","signature":"{SIG}"}}"#),
            r#"{"type":"text","data":"x","signature":"abc"}"#.to_string(),
            format!(r#"{{"type":"file","name":"a.pdf","hash":"xyz","signature":"{SIG}"}}"#),
        ];
        for case in cases {
            assert!(
                matches!(parse_payload(&case), Err(DecodeFailure::Malformed(_))),
                "accepted {case}"
            );
        }
    }

    #[tokio::test]
    async fn test_codec_ignores_unknown_tier() {
        let codec = MemoryCodec::new();
        assert!(codec.decode(&Image(b"Zhello".to_vec())).await.is_none());
    }
}

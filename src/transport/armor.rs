//! Armored text codec
//!
//! Renders payload text as a single line `QRSEAL:<tier>:<base64>` that can be
//! copied by hand or piped into any external QR renderer. Decoding accepts
//! surrounding whitespace; anything else yields no code.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::{ErrorCorrection, Image, OpticalCodec, TransportResult};

/// Leading marker of an armored block
pub const ARMOR_PREFIX: &str = "QRSEAL";

/// Codec producing armored text "images"
#[derive(Default)]
pub struct ArmoredCodec;

impl ArmoredCodec {
    /// Create a new armored codec
    pub fn new() -> Self {
        ArmoredCodec
    }

    /// Wrap armored text read from a terminal or file
    pub fn image_from_str(armored: &str) -> Image {
        Image(armored.trim().as_bytes().to_vec())
    }

    /// Armored text of an image produced by this codec
    pub fn image_to_string(image: &Image) -> String {
        String::from_utf8_lossy(image.as_bytes()).into_owned()
    }
}

#[async_trait]
impl OpticalCodec for ArmoredCodec {
    async fn encode(&self, text: &str, level: ErrorCorrection) -> TransportResult<Image> {
        let armored = format!(
            "{}:{}:{}",
            ARMOR_PREFIX,
            level.as_char(),
            BASE64.encode(text.as_bytes())
        );
        Ok(Image(armored.into_bytes()))
    }

    async fn decode(&self, image: &Image) -> Option<String> {
        let armored = std::str::from_utf8(image.as_bytes()).ok()?.trim();
        let mut parts = armored.splitn(3, ':');

        if parts.next()? != ARMOR_PREFIX {
            return None;
        }
        let mut level = parts.next()?.chars();
        match (level.next(), level.next()) {
            (Some(c), None) => ErrorCorrection::from_char(c)?,
            _ => return None,
        };

        let bytes = BASE64.decode(parts.next()?).ok()?;
        String::from_utf8(bytes).ok()
    }
}

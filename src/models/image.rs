//! Image references as they arrive in admin submissions.
//!
//! A submission mixes already-hosted references with freshly chosen images
//! encoded as `data:` URLs. Both are classified once here and carried as
//! [`ImageSource`] from then on.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::fmt;
use thiserror::Error;

use crate::constants::images::INLINE_PREFIX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageParseError {
    #[error("image reference is empty")]
    Empty,

    #[error("inline image is not a base64 data URL")]
    NotBase64,

    #[error("inline image has unsupported type '{0}'")]
    UnsupportedType(String),

    #[error("inline image payload is not valid base64")]
    InvalidPayload,

    #[error("inline image payload is empty")]
    EmptyPayload,
}

#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Newly chosen image, not yet durable.
    Inline { bytes: Vec<u8>, mime_type: String },

    /// Reference to an object that already lives in object storage.
    Hosted(String),
}

impl ImageSource {
    /// Classifies a submitted image string.
    ///
    /// Strings starting with `data:` must be `data:image/<kind>;base64,<payload>`.
    /// Everything else is treated as a hosted reference and kept verbatim.
    pub fn parse(raw: &str) -> Result<Self, ImageParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ImageParseError::Empty);
        }

        let Some(rest) = raw.strip_prefix(INLINE_PREFIX) else {
            return Ok(Self::Hosted(raw.to_string()));
        };

        let (header, payload) = rest.split_once(',').ok_or(ImageParseError::NotBase64)?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(ImageParseError::NotBase64)?
            .to_ascii_lowercase();

        if !mime_type.starts_with("image/") {
            return Err(ImageParseError::UnsupportedType(mime_type));
        }

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|_| ImageParseError::InvalidPayload)?;
        if bytes.is_empty() {
            return Err(ImageParseError::EmptyPayload);
        }

        Ok(Self::Inline { bytes, mime_type })
    }

    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    #[must_use]
    pub fn hosted_ref(&self) -> Option<&str> {
        match self {
            Self::Hosted(reference) => Some(reference),
            Self::Inline { .. } => None,
        }
    }

    /// Size of the decoded payload; zero for hosted references.
    #[must_use]
    pub fn inline_len(&self) -> usize {
        match self {
            Self::Inline { bytes, .. } => bytes.len(),
            Self::Hosted(_) => 0,
        }
    }
}

// Payloads can be megabytes; keep them out of logs.
impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline { bytes, mime_type } => f
                .debug_struct("Inline")
                .field("mime_type", mime_type)
                .field("len", &bytes.len())
                .finish(),
            Self::Hosted(reference) => f.debug_tuple("Hosted").field(reference).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_reference_passes_through() {
        let source = ImageSource::parse("https://cdn.example.com/a.png").unwrap();
        assert_eq!(source.hosted_ref(), Some("https://cdn.example.com/a.png"));
        assert!(!source.is_inline());
    }

    #[test]
    fn test_inline_data_url_is_decoded() {
        let source = ImageSource::parse("data:image/png;base64,aGVsbG8=").unwrap();
        match source {
            ImageSource::Inline { bytes, mime_type } => {
                assert_eq!(bytes, b"hello");
                assert_eq!(mime_type, "image/png");
            }
            ImageSource::Hosted(_) => panic!("expected inline image"),
        }
    }

    #[test]
    fn test_rejects_malformed_inline_images() {
        assert_eq!(ImageSource::parse("   "), Err(ImageParseError::Empty));
        assert_eq!(
            ImageSource::parse("data:image/png,plain"),
            Err(ImageParseError::NotBase64)
        );
        assert_eq!(
            ImageSource::parse("data:text/plain;base64,aGVsbG8="),
            Err(ImageParseError::UnsupportedType("text/plain".to_string()))
        );
        assert_eq!(
            ImageSource::parse("data:image/png;base64,@@@"),
            Err(ImageParseError::InvalidPayload)
        );
        assert_eq!(
            ImageSource::parse("data:image/png;base64,"),
            Err(ImageParseError::EmptyPayload)
        );
    }

    #[test]
    fn test_debug_hides_payload() {
        let source = ImageSource::Inline {
            bytes: vec![1; 4096],
            mime_type: "image/jpeg".to_string(),
        };
        let rendered = format!("{source:?}");
        assert!(rendered.contains("4096"));
        assert!(rendered.len() < 100);
    }
}

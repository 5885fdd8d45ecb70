use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Extensions (lower-cased, without the dot) the normalizer will attempt.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "heic"];

/// MIME type of every normalized payload.
pub const NORMALIZED_MIME: &str = "image/jpeg";

// =============================================================================
// ImageRef
// =============================================================================

/// One enumerated storage object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Opaque storage path (or URL for remote sources).
    pub key: String,
    /// Lower-cased extension including the dot, empty when there is none.
    pub extension: String,
}

impl ImageRef {
    /// Build a reference from a raw storage key.
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        let extension = extension_of(&key);
        Self { key, extension }
    }

    /// Directory placeholders end with the separator and carry no data.
    pub fn is_directory_marker(&self) -> bool {
        self.key.ends_with('/')
    }

    /// Whether the extension is on the allow-list.
    pub fn has_supported_extension(&self) -> bool {
        self.extension
            .strip_prefix('.')
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }
}

/// Extension of the last path segment, `""` for dotfiles and bare names.
fn extension_of(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

// =============================================================================
// NormalizedImage
// =============================================================================

/// A re-encoded image ready to be embedded in an inference request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// Key of the object this payload was produced from.
    pub source: String,
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
}

impl NormalizedImage {
    /// Wrap already-encoded JPEG bytes.
    pub fn from_jpeg(source: impl Into<String>, jpeg: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
        Self {
            source: source.into(),
            data_url: format!("data:{};base64,{}", NORMALIZED_MIME, encoded),
        }
    }

    /// Decode the payload back to the JPEG bytes it carries.
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>> {
        let prefix = format!("data:{};base64,", NORMALIZED_MIME);
        let encoded = self
            .data_url
            .strip_prefix(&prefix)
            .ok_or_else(|| Error::internal("payload is not a JPEG data URL"))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::internal(format!("payload is not valid base64: {}", e)))
    }
}

// =============================================================================
// Failures
// =============================================================================

/// Why a single object did not make it into the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Extension outside [`ALLOWED_EXTENSIONS`].
    UnsupportedFileType { extension: String },
    /// The blob could not be retrieved.
    DownloadFailed { detail: String },
    /// The bytes are not a raster image we can decode.
    Unidentified { detail: String },
    /// Anything else between fetch and re-encode.
    Unexpected { detail: String },
}

impl FailureReason {
    /// Stable label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType { .. } => "unsupported",
            Self::DownloadFailed { .. } => "download_failed",
            Self::Unidentified { .. } => "unidentified",
            Self::Unexpected { .. } => "unexpected",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFileType { extension } if extension.is_empty() => {
                write!(f, "unsupported file type: (no extension)")
            }
            Self::UnsupportedFileType { extension } => {
                write!(f, "unsupported file type: {}", extension)
            }
            Self::DownloadFailed { detail } => write!(f, "download failed: {}", detail),
            Self::Unidentified { detail } => {
                write!(f, "image could not be identified: {}", detail)
            }
            Self::Unexpected { detail } => {
                write!(f, "unexpected processing error: {}", detail)
            }
        }
    }
}

/// A skipped or failed object, returned verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Originating key (or request field name).
    pub id: String,
    /// Human-readable cause.
    pub reason: String,
}

impl FailureRecord {
    pub fn new(id: impl Into<String>, reason: &FailureReason) -> Self {
        Self {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_with_dot() {
        assert_eq!(ImageRef::from_key("u1/t1/IMG_0001.HEIC").extension, ".heic");
        assert_eq!(ImageRef::from_key("u1/t1/a.b.JpEg").extension, ".jpeg");
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(ImageRef::from_key("u1/t1/README").extension, "");
        assert_eq!(ImageRef::from_key("u1/t1/.hidden").extension, "");
        assert_eq!(ImageRef::from_key("u1/t1.d/photo").extension, "");
    }

    #[test]
    fn test_directory_marker() {
        assert!(ImageRef::from_key("u1/t1/").is_directory_marker());
        assert!(!ImageRef::from_key("u1/t1/a.png").is_directory_marker());
    }

    #[test]
    fn test_allow_list() {
        for key in ["a.png", "a.JPG", "a.jpeg", "a.gif", "a.bmp", "a.heic"] {
            assert!(ImageRef::from_key(key).has_supported_extension(), "{}", key);
        }
        for key in ["a.webp", "a.txt", "a.mov", "noext"] {
            assert!(!ImageRef::from_key(key).has_supported_extension(), "{}", key);
        }
    }

    #[test]
    fn test_normalized_image_payload() {
        let img = NormalizedImage::from_jpeg("k", &[0xFF, 0xD8, 0xFF]);
        assert!(img.data_url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(img.jpeg_bytes().unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_failure_reason_text() {
        let reason = FailureReason::UnsupportedFileType {
            extension: ".txt".into(),
        };
        let record = FailureRecord::new("u1/t1/notes.txt", &reason);
        assert_eq!(record.reason, "unsupported file type: .txt");

        let reason = FailureReason::DownloadFailed {
            detail: "NoSuchKey".into(),
        };
        assert!(reason.to_string().starts_with("download failed"));
        assert_eq!(reason.label(), "download_failed");
    }
}

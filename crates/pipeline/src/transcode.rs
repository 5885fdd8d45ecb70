//! Decode any supported raster image and re-encode it as baseline RGB JPEG.

use image::{DynamicImage, ImageError, ImageFormat};
use std::io::{Cursor, ErrorKind};

use trip_insight_core::types::FailureReason;

/// ISO-BMFF major brands written by HEIC/HEIF encoders.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"mif1", b"msf1",
];

/// Decode `bytes`, drop alpha and any other channels, and encode as JPEG.
///
/// Animated formats contribute their first frame only. HEIC containers go
/// through libheif when the `heic` feature is enabled. Output is
/// deterministic for identical input bytes.
pub fn transcode_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, FailureReason> {
    let rgb = if is_heif(bytes) {
        heif::decode_rgb(bytes)?
    } else {
        image::load_from_memory(bytes)
            .map_err(classify_decode_error)?
            .into_rgb8()
    };

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| FailureReason::Unexpected {
            detail: format!("JPEG encoding failed: {}", e),
        })?;

    Ok(out.into_inner())
}

/// `true` when `bytes` start with an `ftyp` box carrying a HEIF brand.
fn is_heif(bytes: &[u8]) -> bool {
    bytes.len() >= 12
        && &bytes[4..8] == b"ftyp"
        && HEIF_BRANDS.iter().any(|brand| &bytes[8..12] == *brand)
}

#[cfg(feature = "heic")]
mod heif {
    use image::RgbImage;
    use libheif_rs::{ColorSpace, HeifContext, HeifError, HeifErrorCode, LibHeif, RgbChroma};

    use trip_insight_core::types::FailureReason;

    /// Decode the primary image of a HEIF container into packed RGB.
    pub(super) fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, FailureReason> {
        let lib = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes).map_err(classify)?;
        let handle = ctx.primary_image_handle().map_err(classify)?;
        let decoded = lib
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(classify)?;

        let plane = decoded
            .planes()
            .interleaved
            .ok_or_else(|| FailureReason::Unexpected {
                detail: "libheif returned no interleaved RGB plane".to_string(),
            })?;

        // Rows may be padded past width * 3.
        let row_len = plane.width as usize * 3;
        let mut pixels = Vec::with_capacity(row_len * plane.height as usize);
        for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }

        RgbImage::from_raw(plane.width, plane.height, pixels).ok_or_else(|| {
            FailureReason::Unexpected {
                detail: "decoded HEIC plane has an unexpected size".to_string(),
            }
        })
    }

    fn classify(err: HeifError) -> FailureReason {
        match err.code {
            HeifErrorCode::InvalidInput
            | HeifErrorCode::UnsupportedFileType
            | HeifErrorCode::UnsupportedFeature
            | HeifErrorCode::DecoderPluginError => FailureReason::Unidentified {
                detail: err.to_string(),
            },
            _ => FailureReason::Unexpected {
                detail: err.to_string(),
            },
        }
    }
}

#[cfg(not(feature = "heic"))]
mod heif {
    use image::RgbImage;

    use trip_insight_core::types::FailureReason;

    pub(super) fn decode_rgb(_bytes: &[u8]) -> Result<RgbImage, FailureReason> {
        Err(FailureReason::Unidentified {
            detail: "HEIC decoding is not built in (enable the `heic` feature)".to_string(),
        })
    }
}

/// Malformed, truncated, or unknown containers are "unidentified"; resource
/// limits and parameter problems are unexpected.
fn classify_decode_error(err: ImageError) -> FailureReason {
    match err {
        ImageError::Decoding(_) | ImageError::Unsupported(_) => FailureReason::Unidentified {
            detail: err.to_string(),
        },
        ImageError::IoError(ref io) if io.kind() == ErrorKind::UnexpectedEof => {
            FailureReason::Unidentified {
                detail: format!("truncated image data: {}", io),
            }
        }
        other => FailureReason::Unexpected {
            detail: other.to_string(),
        },
    }
}

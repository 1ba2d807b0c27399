//! Image decoding and JPEG encoding of finished mosaics.
//!
//! Uploaded images and tiles may be in any format the `image` crate was built
//! with (JPEG, PNG). The finished mosaic is always encoded as JPEG; its alpha
//! channel is dropped, so unpainted cells come out black.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, RgbaImage};
use std::io::Cursor;

use crate::error::MosaicError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Decode an image of any supported format, guessing the format from its
/// magic bytes.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, MosaicError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| MosaicError::Decode {
            message: e.to_string(),
        })?;

    reader.decode().map_err(|e| MosaicError::Decode {
        message: e.to_string(),
    })
}

// =============================================================================
// JPEG Encoder
// =============================================================================

/// Encodes finished mosaics as JPEG at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct MosaicEncoder {
    quality: u8,
}

impl Default for MosaicEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl MosaicEncoder {
    /// Create an encoder. Out-of-range qualities are clamped to 1-100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: clamp_quality(quality),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode the mosaic as a baseline JPEG.
    pub fn encode(&self, mosaic: &RgbaImage) -> Result<Bytes, MosaicError> {
        let rgb = DynamicImage::ImageRgba8(mosaic.clone()).into_rgb8();

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| MosaicError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to the valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================

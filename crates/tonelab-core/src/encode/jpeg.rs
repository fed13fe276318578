//! JPEG encoding for saving an adjusted image.
//!
//! The alpha channel is dropped; JPEG has no transparency.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::types::Image;

/// Quality used when the caller has no preference.
pub const DEFAULT_QUALITY: u8 = 100;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an image to JPEG bytes.
///
/// # Arguments
///
/// * `image` - The image to encode (alpha is discarded)
/// * `quality` - JPEG quality, clamped to 1-100
///
/// # Example
///
/// ```
/// use tonelab_core::encode::{encode_jpeg, DEFAULT_QUALITY};
/// use tonelab_core::placeholder_image;
///
/// let jpeg = encode_jpeg(&placeholder_image(), DEFAULT_QUALITY).unwrap();
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(image: &Image, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let quality = quality.clamp(1, 100);

    let rgb: Vec<u8> = image
        .pixels()
        .flat_map(|p| [p.red, p.green, p.blue])
        .collect();

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(&rgb, image.width(), image.height(), ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    let bytes = buffer.into_inner();
    log::debug!(
        "encoded {}x{} JPEG at quality {} ({} bytes)",
        image.width(),
        image.height(),
        quality,
        bytes.len()
    );
    Ok(bytes)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::types::Pixel;
    use proptest::prelude::*;

    proptest! {
        /// Property: Same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            quality in 1u8..=100,
            (r, g, b) in (any::<u8>(), any::<u8>(), any::<u8>()),
        ) {
            let img = Image::filled(width, height, Pixel::rgb(r, g, b)).unwrap();
            let first = encode_jpeg(&img, quality);
            let second = encode_jpeg(&img, quality);

            prop_assert!(first.is_ok() && second.is_ok());
            prop_assert_eq!(first.unwrap(), second.unwrap());
        }
    }
}

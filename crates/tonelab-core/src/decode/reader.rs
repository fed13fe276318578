//! Format sniffing and decoding through the `image` crate.

use std::io::Cursor;

use image::ImageReader;
use thiserror::Error;

use crate::types::{Image, ImageError};

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded buffer could not be turned into an image.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Decode encoded image bytes into an RGBA image.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if the data is truncated or invalid.
pub fn decode_image(bytes: &[u8]) -> Result<Image, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let image = Image::from_rgba_image(img.into_rgba8())?;
    log::debug!("decoded {}x{} image", image.width(), image.height());
    Ok(image)
}

//! Image loading WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode JPEG or PNG bytes into an RGBA image
//! - [`placeholder_image`] - The gradient shown before any photo is loaded
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, placeholder_image } from '@tonelab/wasm';
//!
//! let baseline = placeholder_image();
//! input.onchange = async () => {
//!   const bytes = new Uint8Array(await input.files[0].arrayBuffer());
//!   baseline = decode_image(bytes);
//! };
//! ```

use crate::types::JsImage;
use tonelab_core::decode;
use wasm_bindgen::prelude::*;

/// Decode encoded image bytes (JPEG or PNG) into an RGBA image.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsImage::from_image)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The 200x100 start-up gradient.
#[wasm_bindgen]
pub fn placeholder_image() -> JsImage {
    JsImage::from_image(tonelab_core::placeholder_image())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_image() {
        let img = placeholder_image();
        assert_eq!(img.width(), 200);
        assert_eq!(img.height(), 100);
        assert_eq!(&img.pixels()[0..4], &[40, 80, 120, 255]);
    }

    #[test]
    fn test_core_decode_of_encoded_placeholder() {
        // JsValue errors only exist on wasm32; exercise the core path here
        let jpeg = tonelab_core::encode::encode_jpeg(&tonelab_core::placeholder_image(), 90).unwrap();
        let decoded = decode::decode_image(&jpeg).unwrap();
        assert_eq!(decoded.width(), 200);
    }
}

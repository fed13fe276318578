//! Image encoding WASM bindings.
//!
//! Exposes JPEG export so the front end can save the adjusted image.
//!
//! # Example
//!
//! ```typescript
//! import { encode_jpeg } from '@tonelab/wasm';
//!
//! const jpeg = encode_jpeg(adjusted, 100);
//! const writable = await fileHandle.createWritable();
//! await writable.write(new Blob([jpeg], { type: 'image/jpeg' }));
//! await writable.close();
//! ```

use crate::types::JsImage;
use tonelab_core::encode;
use wasm_bindgen::prelude::*;

/// Encode an image to JPEG bytes.
///
/// # Arguments
///
/// * `image` - The image to encode (alpha is dropped)
/// * `quality` - JPEG quality (1-100); values outside the range are clamped
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(image.as_image(), quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Default JPEG quality for saving.
#[wasm_bindgen]
pub fn default_jpeg_quality() -> u8 {
    encode::DEFAULT_QUALITY
}


/// WASM-specific tests that require JsValue.
///
/// Run with `wasm-pack test`.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_jpeg_basic() {
        let img = crate::decode::placeholder_image();
        let jpeg = encode_jpeg(&img, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }
}

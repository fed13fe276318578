//! Slider controls WASM bindings.
//!
//! This module provides JavaScript bindings for the Controls type, allowing
//! the four slider values to be manipulated from TypeScript.

use crate::types::JsImage;
use wasm_bindgen::prelude::*;

/// Slider controls wrapper for JavaScript
#[wasm_bindgen]
pub struct Controls {
    inner: tonelab_core::Controls,
}

#[wasm_bindgen]
impl Controls {
    /// Create new controls at their identity values
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: tonelab_core::Controls::default(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.brightness = value;
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.contrast = value;
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.saturation = value;
    }

    #[wasm_bindgen(getter)]
    pub fn gamma(&self) -> f32 {
        self.inner.gamma
    }

    #[wasm_bindgen(setter)]
    pub fn set_gamma(&mut self, value: f32) {
        self.inner.gamma = value;
    }

    /// Check if all controls are at their identity values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to JSON for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Deserialize from JSON
    pub fn from_json(value: JsValue) -> Result<Controls, JsValue> {
        let inner: tonelab_core::Controls =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Controls {
    pub(crate) fn inner(&self) -> &tonelab_core::Controls {
        &self.inner
    }
}

/// Apply all four adjustments to an image.
///
/// The source image is left untouched; a new image is returned.
///
/// # Example (TypeScript)
/// ```typescript
/// const controls = new Controls();
/// controls.brightness = 20;
/// controls.gamma = 0.8;
///
/// const adjusted = adjust_image(baseline, controls);
/// ctx.putImageData(new ImageData(new Uint8ClampedArray(adjusted.pixels()), adjusted.width), 0, 0);
/// ```
#[wasm_bindgen]
pub fn adjust_image(image: &JsImage, controls: &Controls) -> JsImage {
    JsImage::from_image(tonelab_core::adjust(image.as_image(), controls.inner()))
}

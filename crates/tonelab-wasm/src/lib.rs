//! Tonelab WASM - WebAssembly bindings for Tonelab
//!
//! This crate provides WASM bindings to expose the tonelab-core functionality
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `adjustments` - Slider controls and the one-shot `adjust_image` call
//! - `session` - Baseline ownership and latest-wins rendering
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image loading (decode bytes, placeholder gradient)
//! - `encode` - JPEG export
//!
//! # Usage
//!
//! ```typescript
//! import init, { EditSession, Controls, placeholder_image } from '@tonelab/wasm';
//!
//! await init();
//!
//! const session = new EditSession(placeholder_image());
//! const controls = new Controls();
//! controls.contrast = 40;
//! const frame = session.request(controls);
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod console;
mod decode;
mod encode;
mod session;
mod types;

// Re-export public types
pub use adjustments::{adjust_image, Controls};
pub use decode::{decode_image, placeholder_image};
pub use encode::{default_jpeg_quality, encode_jpeg};
pub use session::EditSession;
pub use types::JsImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console::install(log::LevelFilter::Info);
}

/// Change the console log level. Returns false for an unknown level name.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match console::parse_level(level) {
        Some(filter) => {
            log::set_max_level(filter);
            true
        }
        None => false,
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

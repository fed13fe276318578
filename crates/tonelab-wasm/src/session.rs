//! Editing session bindings with latest-wins rendering.
//!
//! A session owns the baseline image and a render gate. The front end calls
//! `begin()` whenever a slider moves and later passes the returned sequence
//! to `render()`. On wasm `render()` runs synchronously on the calling thread,
//! so a session cannot be handed to a Web Worker and a render cannot be
//! interrupted part way. Cancellation applies when JS calls `begin()`, awaits
//! (e.g. the next animation frame), and only then calls `render(seq)`: if
//! another `begin()` happened in between, `render` returns `undefined`
//! instead of an image, so a stale result never overwrites a newer one.
//!
//! # Example
//!
//! ```typescript
//! const session = new EditSession(placeholder_image());
//!
//! slider.oninput = async () => {
//!   const seq = session.begin();
//!   await new Promise(requestAnimationFrame);
//!   const frame = session.render(seq, readControls());
//!   if (frame !== undefined) draw(frame);
//! };
//! ```

use crate::adjustments::Controls;
use crate::types::JsImage;
use tonelab_core::{adjust_cancellable, Image, RenderGate};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct EditSession {
    baseline: Image,
    gate: RenderGate,
}

#[wasm_bindgen]
impl EditSession {
    /// Start a session with a copy of `baseline`.
    #[wasm_bindgen(constructor)]
    pub fn new(baseline: &JsImage) -> EditSession {
        EditSession {
            baseline: baseline.as_image().clone(),
            gate: RenderGate::new(),
        }
    }

    /// Replace the baseline and cancel any outstanding render.
    pub fn set_baseline(&mut self, baseline: &JsImage) {
        self.gate.cancel_all();
        self.baseline = baseline.as_image().clone();
        log::debug!(
            "session baseline replaced with {}x{} image",
            self.baseline.width(),
            self.baseline.height()
        );
    }

    /// Copy of the current baseline.
    pub fn baseline(&self) -> JsImage {
        JsImage::from_image(self.baseline.clone())
    }

    /// Start a new render request, superseding all earlier ones.
    pub fn begin(&self) -> u64 {
        self.gate.begin().sequence()
    }

    /// Whether `sequence` is still the newest request.
    pub fn is_current(&self, sequence: u64) -> bool {
        self.gate.is_current(sequence)
    }

    /// Render `controls` for request `sequence`.
    ///
    /// Returns `undefined` if the request has been superseded.
    pub fn render(&self, sequence: u64, controls: &Controls) -> Option<JsImage> {
        let token = self.gate.token_for(sequence);
        adjust_cancellable(&self.baseline, controls.inner(), &token).map(JsImage::from_image)
    }

    /// Begin a request and render it immediately.
    pub fn request(&self, controls: &Controls) -> Option<JsImage> {
        let sequence = self.begin();
        self.render(sequence, controls)
    }
}

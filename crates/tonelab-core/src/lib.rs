//! Tonelab Core - Tone adjustment library
//!
//! This crate provides the core image processing functionality for Tonelab:
//! the brightness/contrast/saturation/gamma pipeline, latest-wins render
//! cancellation, a background preview worker, and image decode/export.

pub mod adjustments;
pub mod cancel;
pub mod decode;
pub mod encode;
pub mod placeholder;
#[cfg(not(target_arch = "wasm32"))]
pub mod preview;
pub mod types;

pub use adjustments::{adjust, adjust_cancellable, clamp_channel};
pub use cancel::{CancelToken, RenderGate};
pub use placeholder::placeholder_image;
pub use types::{Image, ImageError, Pixel};

/// Slider controls for the adjustment pipeline.
///
/// None of the values are range-checked; out-of-range values produce
/// clamped output.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Controls {
    /// Added to every color channel (truncated toward zero)
    pub brightness: f32,
    /// Contrast around the image's mean brightness (0 = unchanged)
    pub contrast: f32,
    /// Saturation around each pixel's RGB mean (0 = unchanged)
    pub saturation: f32,
    /// Gamma exponent (1.0 = unchanged)
    pub gamma: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            gamma: 1.0,
        }
    }
}

impl Controls {
    pub fn new(brightness: f32, contrast: f32, saturation: f32, gamma: f32) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
            gamma,
        }
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_default() {
        let controls = Controls::default();
        assert!(controls.is_default());
        assert_eq!(controls.gamma, 1.0);
    }

    #[test]
    fn test_controls_not_default() {
        let mut controls = Controls::default();
        controls.saturation = 12.0;
        assert!(!controls.is_default());
    }

    #[test]
    fn test_controls_json_round_trip() {
        let controls = Controls::new(25.0, -40.0, 10.5, 0.8);
        let json = serde_json::to_string(&controls).unwrap();
        assert!(json.contains("\"brightness\":25.0"));

        let parsed: Controls = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, controls);
    }
}

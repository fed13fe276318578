//! Image decoding for Tonelab.
//!
//! Turns encoded file bytes (JPEG or PNG) into an RGBA [`Image`] that can
//! become the new baseline.
//!
//! # Examples
//!
//! ```ignore
//! use tonelab_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width(), image.height());
//! ```
//!
//! [`Image`]: crate::types::Image

mod reader;

pub use reader::{decode_image, DecodeError};

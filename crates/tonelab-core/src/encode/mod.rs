//! Image encoding for Tonelab.
//!
//! Produces JPEG bytes for the caller to persist; where the bytes end up is
//! the caller's concern.
//!
//! # Examples
//!
//! ```ignore
//! use tonelab_core::encode::{encode_jpeg, DEFAULT_QUALITY};
//!
//! let jpeg_bytes = encode_jpeg(&adjusted, DEFAULT_QUALITY).unwrap();
//! std::fs::write("edited.jpg", jpeg_bytes).unwrap();
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, DEFAULT_QUALITY};

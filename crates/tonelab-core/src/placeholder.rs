//! Start-up placeholder image shown before a photo is loaded.

use crate::types::{Image, Pixel};

/// Placeholder width in pixels.
pub const PLACEHOLDER_WIDTH: u32 = 200;

/// Placeholder height in pixels.
pub const PLACEHOLDER_HEIGHT: u32 = 100;

/// Generate the 200x100 gradient pattern used as the initial baseline.
///
/// Channels wrap every 100 pixels: `R = x % 100 + 40`, `G = y % 100 + 80`,
/// `B = (x + y) % 100 + 120`, fully opaque.
pub fn placeholder_image() -> Image {
    let mut pixels = Vec::with_capacity((PLACEHOLDER_WIDTH * PLACEHOLDER_HEIGHT) as usize);
    for y in 0..PLACEHOLDER_HEIGHT {
        for x in 0..PLACEHOLDER_WIDTH {
            pixels.push(pattern_pixel(x, y));
        }
    }

    Image::from_pixels_unchecked(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, &pixels)
}

#[inline]
fn pattern_pixel(x: u32, y: u32) -> Pixel {
    // Max values: 99 + 40, 99 + 80, 99 + 120 all fit in u8
    Pixel::rgb(
        (x % 100 + 40) as u8,
        (y % 100 + 80) as u8,
        ((x + y) % 100 + 120) as u8,
    )
}

//! Core image types shared by every stage of the pipeline.
//!
//! Images are stored as row-major RGBA bytes (4 bytes per pixel). Every
//! pipeline stage works on an owned [`Image`]; the baseline is cloned before
//! a render so that adjustments never accumulate.

use thiserror::Error;

/// Bytes per pixel in the RGBA buffer.
pub const CHANNELS: usize = 4;

/// Errors raised when building an [`Image`] from raw parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// A single pixel split into its four 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Pixel {
    /// Create a pixel from alpha, red, green and blue channels.
    pub const fn argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// Create a fully opaque pixel.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::argb(255, red, green, blue)
    }

    #[inline]
    fn from_rgba(chunk: &[u8]) -> Self {
        Self::argb(chunk[3], chunk[0], chunk[1], chunk[2])
    }

    #[inline]
    fn write_rgba(self, chunk: &mut [u8]) {
        chunk[0] = self.red;
        chunk[1] = self.green;
        chunk[2] = self.blue;
        chunk[3] = self.alpha;
    }
}

/// A 2D grid of ARGB pixels backed by an RGBA byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Create an image from dimensions and RGBA pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidDimensions`] if either dimension is zero
    /// or `width * height * 4` overflows `usize`, and
    /// [`ImageError::InvalidPixelData`] if `pixels.len()` is not that size.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageError> {
        let expected = buffer_len(width, height)?;
        if pixels.len() != expected {
            return Err(ImageError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create an image filled with a single pixel value.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Result<Self, ImageError> {
        let mut pixels = vec![0u8; buffer_len(width, height)?];
        for chunk in pixels.chunks_exact_mut(CHANNELS) {
            pixel.write_rgba(chunk);
        }
        Self::new(width, height, pixels)
    }

    /// Build an image from row-major pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Pixel]) -> Result<Self, ImageError> {
        Self::new(width, height, pack_rgba(pixels))
    }

    /// Build an image from row-major pixels whose count is known to match.
    pub(crate) fn from_pixels_unchecked(width: u32, height: u32, pixels: &[Pixel]) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize),
            "Pixel count mismatch"
        );
        Self {
            width,
            height,
            pixels: pack_rgba(pixels),
        }
    }

    /// Create an image from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Result<Self, ImageError> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Convert to an `image::RgbaImage` for encoding.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Raw RGBA bytes in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the image and return its RGBA bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// Read the pixel at (x, y), or `None` when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        let offset = self.offset(x, y)?;
        Some(Pixel::from_rgba(&self.pixels[offset..offset + CHANNELS]))
    }

    /// Overwrite the pixel at (x, y). Returns `false` when out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Pixel) -> bool {
        match self.offset(x, y) {
            Some(offset) => {
                pixel.write_rgba(&mut self.pixels[offset..offset + CHANNELS]);
                true
            }
            None => false,
        }
    }

    /// Iterate over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.pixels.chunks_exact(CHANNELS).map(Pixel::from_rgba)
    }

    /// Rewrite every pixel in place with `f`.
    pub fn map_pixels_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(Pixel) -> Pixel,
    {
        for chunk in self.pixels.chunks_exact_mut(CHANNELS) {
            f(Pixel::from_rgba(chunk)).write_rgba(chunk);
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + x as usize) * CHANNELS)
    }
}

/// Byte length of a `width` x `height` RGBA buffer.
fn buffer_len(width: u32, height: u32) -> Result<usize, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|count| count.checked_mul(CHANNELS))
        .ok_or(ImageError::InvalidDimensions { width, height })
}

// A `&[Pixel]` already fits in memory, so `len * CHANNELS` cannot overflow
fn pack_rgba(pixels: &[Pixel]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len() * CHANNELS];
    for (chunk, pixel) in bytes.chunks_exact_mut(CHANNELS).zip(pixels) {
        pixel.write_rgba(chunk);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_dimensions() {
        let result = Image::new(0, 10, vec![]);
        assert_eq!(
            result,
            Err(ImageError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_new_validates_buffer_length() {
        let result = Image::new(2, 2, vec![0u8; 15]);
        assert_eq!(
            result,
            Err(ImageError::InvalidPixelData {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_new_rejects_overflowing_dimensions() {
        let result = Image::new(1 << 31, 1 << 31, vec![]);
        assert_eq!(
            result,
            Err(ImageError::InvalidDimensions {
                width: 1 << 31,
                height: 1 << 31
            })
        );
    }

    #[test]
    fn test_filled_rejects_overflowing_dimensions() {
        let result = Image::filled(u32::MAX, u32::MAX, Pixel::rgb(0, 0, 0));
        assert!(matches!(result, Err(ImageError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_get_and_put_pixel() {
        let mut img = Image::filled(3, 2, Pixel::rgb(10, 20, 30)).unwrap();
        assert_eq!(img.get_pixel(2, 1), Some(Pixel::rgb(10, 20, 30)));

        assert!(img.put_pixel(1, 1, Pixel::argb(128, 1, 2, 3)));
        assert_eq!(img.get_pixel(1, 1), Some(Pixel::argb(128, 1, 2, 3)));

        // Row-major layout: (1, 1) in a 3-wide image is pixel index 4
        assert_eq!(&img.as_bytes()[16..20], &[1, 2, 3, 128]);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut img = Image::filled(2, 2, Pixel::rgb(0, 0, 0)).unwrap();
        assert_eq!(img.get_pixel(2, 0), None);
        assert_eq!(img.get_pixel(0, 2), None);
        assert!(!img.put_pixel(5, 5, Pixel::rgb(1, 1, 1)));
    }

    #[test]
    fn test_from_pixels_row_major() {
        let img = Image::from_pixels(
            2,
            1,
            &[Pixel::rgb(1, 2, 3), Pixel::argb(7, 4, 5, 6)],
        )
        .unwrap();
        assert_eq!(img.as_bytes(), &[1, 2, 3, 255, 4, 5, 6, 7]);
        assert_eq!(img.pixels().count(), 2);
    }

    #[test]
    fn test_from_pixels_wrong_count() {
        let result = Image::from_pixels(2, 2, &[Pixel::rgb(1, 2, 3)]);
        assert!(matches!(result, Err(ImageError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_rgba_image_conversion() {
        let img = Image::filled(4, 3, Pixel::argb(200, 50, 60, 70)).unwrap();
        let rgba = img.to_rgba_image().unwrap();
        assert_eq!(rgba.dimensions(), (4, 3));
        assert_eq!(rgba.get_pixel(3, 2).0, [50, 60, 70, 200]);

        let back = Image::from_rgba_image(rgba).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_map_pixels_in_place() {
        let mut img = Image::filled(2, 2, Pixel::rgb(10, 10, 10)).unwrap();
        img.map_pixels_in_place(|p| Pixel::argb(p.alpha, p.red + 1, p.green, p.blue));
        assert!(img.pixels().all(|p| p == Pixel::rgb(11, 10, 10)));
    }
}

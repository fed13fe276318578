//! Tone adjustment pipeline.
//!
//! Applies the four slider controls to a copy of a baseline image.
//!
//! ## Stage Order
//! 1. Brightness
//! 2. Contrast (pivot: mean brightness of the brightness-adjusted image)
//! 3. Saturation (pivot: per-pixel RGB mean)
//! 4. Gamma
//!
//! The order is load-bearing: contrast measures its average after brightness
//! has run, and gamma sees whatever the first three stages produced.
//!
//! ## Float conversion
//!
//! Every per-channel result is computed in `f64` and truncated toward zero
//! with `as i32` before clamping. `as` saturates at the `i32` range and maps
//! NaN to 0, so the contrast/saturation singularity at `value == 255`
//! resolves to 0 or 255 instead of panicking. That singularity is not
//! guarded: channels above the pivot go to 255, channels below it go to 0,
//! and channels exactly on the pivot (`inf * 0 = NaN`) go to 0.

use crate::cancel::CancelToken;
use crate::types::{Image, Pixel};
use crate::Controls;

/// Run the full pipeline on a copy of `baseline`.
///
/// The baseline is only borrowed; repeated calls with different controls
/// always start from the same pixels.
///
/// # Example
/// ```
/// use tonelab_core::{adjust, Controls, Image, Pixel};
///
/// let baseline = Image::filled(2, 2, Pixel::rgb(40, 80, 120)).unwrap();
/// let mut controls = Controls::default();
/// controls.brightness = 10.0;
///
/// let adjusted = adjust(&baseline, &controls);
/// assert_eq!(adjusted.get_pixel(0, 0), Some(Pixel::rgb(50, 90, 130)));
/// ```
pub fn adjust(baseline: &Image, controls: &Controls) -> Image {
    let mut working = baseline.clone();
    apply_brightness(&mut working, controls.brightness);
    apply_contrast(&mut working, controls.contrast);
    apply_saturation(&mut working, controls.saturation);
    apply_gamma(&mut working, controls.gamma);
    working
}

/// Run the full pipeline, giving up as soon as `token` is superseded.
///
/// The token is checked before each stage and once more before the result is
/// handed back. A cancelled run returns `None` and its partial work is
/// dropped.
pub fn adjust_cancellable(
    baseline: &Image,
    controls: &Controls,
    token: &CancelToken,
) -> Option<Image> {
    let stages: [(fn(&mut Image, f32), f32); 4] = [
        (apply_brightness, controls.brightness),
        (apply_contrast, controls.contrast),
        (apply_saturation, controls.saturation),
        (apply_gamma, controls.gamma),
    ];

    let mut working = baseline.clone();
    for (stage, value) in stages {
        if token.is_cancelled() {
            log::trace!("render {} cancelled between stages", token.sequence());
            return None;
        }
        stage(&mut working, value);
    }

    if token.is_cancelled() {
        log::trace!("render {} cancelled after final stage", token.sequence());
        return None;
    }
    Some(working)
}

/// Clamp a channel value to `[0, 255]`.
#[inline]
pub fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Integer mean of `(R + G + B) / 3` over every pixel.
///
/// Sums are accumulated across the whole image before the single integer
/// division, matching `(ΣR + ΣG + ΣB) / (pixels * 3)`.
pub fn average_brightness(image: &Image) -> i32 {
    let (mut red, mut green, mut blue) = (0u64, 0u64, 0u64);
    for p in image.pixels() {
        red += u64::from(p.red);
        green += u64::from(p.green);
        blue += u64::from(p.blue);
    }
    let samples = image.pixel_count() as u64 * 3;
    ((red + green + blue).checked_div(samples).unwrap_or(0)) as i32
}

/// Add `value` (truncated toward zero) to each color channel.
pub fn apply_brightness(image: &mut Image, value: f32) {
    let delta = value as i32;
    if delta == 0 {
        return;
    }
    image.map_pixels_in_place(|p| {
        Pixel::argb(
            p.alpha,
            clamp_channel(i32::from(p.red).saturating_add(delta)),
            clamp_channel(i32::from(p.green).saturating_add(delta)),
            clamp_channel(i32::from(p.blue).saturating_add(delta)),
        )
    });
}

/// Stretch channels away from the image's mean brightness.
///
/// `factor = (255 + value) / (255 - value)`, pivot = [`average_brightness`]
/// of the image as it is now.
pub fn apply_contrast(image: &mut Image, value: f32) {
    let avg = average_brightness(image);
    let factor = scale_factor(value);
    image.map_pixels_in_place(|p| {
        Pixel::argb(
            p.alpha,
            pivot_scale(p.red, avg, factor),
            pivot_scale(p.green, avg, factor),
            pivot_scale(p.blue, avg, factor),
        )
    });
}

/// Stretch each pixel's channels away from that pixel's own RGB mean.
pub fn apply_saturation(image: &mut Image, value: f32) {
    let factor = scale_factor(value);
    image.map_pixels_in_place(|p| {
        let rgb_avg = (i32::from(p.red) + i32::from(p.green) + i32::from(p.blue)) / 3;
        Pixel::argb(
            p.alpha,
            pivot_scale(p.red, rgb_avg, factor),
            pivot_scale(p.green, rgb_avg, factor),
            pivot_scale(p.blue, rgb_avg, factor),
        )
    });
}

/// Raise each normalized channel to the power `value`.
///
/// `value <= 0` is not rejected: `0^0` is 1 and `0^-x` is infinite, both of
/// which clamp to 255.
pub fn apply_gamma(image: &mut Image, value: f32) {
    let exponent = f64::from(value);
    image.map_pixels_in_place(|p| {
        Pixel::argb(
            p.alpha,
            gamma_channel(p.red, exponent),
            gamma_channel(p.green, exponent),
            gamma_channel(p.blue, exponent),
        )
    });
}

/// The contrast/saturation factor `(255 + value) / (255 - value)`.
#[inline]
pub fn scale_factor(value: f32) -> f64 {
    let value = f64::from(value);
    (255.0 + value) / (255.0 - value)
}

#[inline]
fn pivot_scale(channel: u8, pivot: i32, factor: f64) -> u8 {
    let offset = f64::from(i32::from(channel) - pivot);
    clamp_channel((factor * offset + f64::from(pivot)) as i32)
}

#[inline]
fn gamma_channel(channel: u8, exponent: f64) -> u8 {
    let normalized = f64::from(channel) / 255.0;
    clamp_channel((255.0 * normalized.powf(exponent)) as i32)
}

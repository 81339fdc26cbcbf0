//! Per-pixel luminance quantization onto a two-color palette.
//!
//! This is the pixel loop of the retro pipeline: Rec. 601 luma,
//! midpoint-centered contrast, a Bayer threshold offset, and a binary
//! light/dark decision. The buffer walk mutates RGBA data in place and
//! forces every output pixel fully opaque.

use crate::matrix::bayer_offset;
use crate::palette::Palette;

/// Luminance midpoint; contrast scales deviation from this value and the
/// Bayer offset is centered on it.
const MIDPOINT: f32 = 128.0;

/// Configuration for the quantizer.
///
/// # Example
///
/// ```
/// use bayer_dither::QuantizeOptions;
///
/// let options = QuantizeOptions::new()
///     .threshold(140)
///     .dither_amount(0.8)
///     .contrast(1.2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeOptions {
    /// Luminance cutoff (0..=255). A pixel is light when its adjusted
    /// luma plus the dither offset strictly exceeds this value.
    pub threshold: u8,

    /// Scale applied to the Bayer matrix contribution (0.0..=1.0).
    /// Zero disables dithering entirely; one applies the full matrix.
    pub dither_amount: f32,

    /// Multiplier on luminance deviation from the midpoint (128).
    pub contrast: f32,

    /// Swap which palette color represents light vs dark classification.
    pub invert: bool,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            threshold: 128,
            dither_amount: 0.5,
            contrast: 1.0,
            invert: false,
        }
    }
}

impl QuantizeOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the luminance cutoff.
    #[inline]
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the dither matrix contribution scale.
    #[inline]
    pub fn dither_amount(mut self, amount: f32) -> Self {
        self.dither_amount = amount;
        self
    }

    /// Set the contrast multiplier.
    #[inline]
    pub fn contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    /// Set the palette swap flag.
    #[inline]
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

/// Rec. 601 weighted grayscale brightness estimate, in `[0, 255]`.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

/// Classify the pixel at `(x, y)` as light (`true`) or dark (`false`).
///
/// The decision is `adjusted_luma + dither_offset > threshold`, strictly.
/// `invert` does not participate here; it only swaps colors when the
/// palette is resolved.
#[inline]
pub fn classify(x: u32, y: u32, r: u8, g: u8, b: u8, options: &QuantizeOptions) -> bool {
    let adjusted = (luma(r, g, b) - MIDPOINT) * options.contrast + MIDPOINT;
    let offset = (bayer_offset(x, y) - MIDPOINT) * options.dither_amount;
    adjusted + offset > f32::from(options.threshold)
}

/// Quantize a straight-alpha RGBA8 buffer in place.
///
/// Walks the buffer row-major, classifies every pixel, and overwrites it
/// with the effective light or dark palette color. Alpha is forced to 255:
/// source transparency is intentionally discarded. The palette swap for
/// `options.invert` is resolved once per call.
///
/// `buf.len()` must equal `width * height * 4` (debug-asserted).
pub fn map_rgba_in_place(
    buf: &mut [u8],
    width: u32,
    height: u32,
    palette: &Palette,
    options: &QuantizeOptions,
) {
    debug_assert_eq!(
        buf.len(),
        width as usize * height as usize * 4,
        "RGBA buffer length must match {width}x{height}"
    );

    let (dark, light) = palette.resolve(options.invert);

    for y in 0..height {
        for x in 0..width {
            let i = (y as usize * width as usize + x as usize) * 4;
            let color = if classify(x, y, buf[i], buf[i + 1], buf[i + 2], options) {
                light
            } else {
                dark
            };
            buf[i] = color.r;
            buf[i + 1] = color.g;
            buf[i + 2] = color.b;
            buf[i + 3] = 255;
        }
    }
}

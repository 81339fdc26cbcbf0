//! bayer-dither: ordered dithering and two-color palette math
//!
//! This library holds the pure numeric core of the retrotone pipeline:
//! the 4x4 Bayer threshold matrix, hex color parsing, and the per-pixel
//! luminance quantizer that maps an RGBA buffer onto a two-color palette.
//! It has no state and no I/O; everything here is deterministic.
//!
//! # Quick Start
//!
//! ```
//! use bayer_dither::{map_rgba_in_place, Palette, QuantizeOptions};
//!
//! let palette = Palette::from_hex("#222323", "#f0f6f0");
//! let options = QuantizeOptions::new().threshold(110).dither_amount(0.0);
//!
//! // A 2x2 mid-gray RGBA image
//! let mut pixels = vec![128u8; 2 * 2 * 4];
//! map_rgba_in_place(&mut pixels, 2, 2, &palette, &options);
//!
//! // Mid-gray luma (128) is above the 110 threshold: every pixel is light
//! assert_eq!(&pixels[0..3], &[0xf0, 0xf6, 0xf0]);
//! ```
//!
//! # Pipeline
//!
//! For every pixel `(x, y)` of the input buffer:
//!
//! ```text
//! luma   = 0.299 r + 0.587 g + 0.114 b        (Rec. 601 weights)
//! luma   = (luma - 128) * contrast + 128      (midpoint-centered contrast)
//! offset = (bayer_offset(x, y) - 128) * dither_amount
//! light  = luma + offset > threshold
//! ```
//!
//! The output pixel is the light or dark palette color (swapped when
//! `invert` is set), always fully opaque. There is never an intermediate
//! tone: the spatially varying Bayer offset is what simulates mid-tones
//! out of exactly two colors.
//!
//! # Color Parsing
//!
//! Two parsers share one grammar (`#RRGGBB`, case-insensitive, `#`
//! optional):
//!
//! - [`Rgb::from_hex`] is lenient: malformed input yields black. This is
//!   the historical behavior of the settings surface and is kept for
//!   compatibility.
//! - `str::parse::<Rgb>()` is strict and returns [`ParseColorError`] so
//!   callers can surface bad input instead of silently rendering black.

pub mod matrix;
pub mod palette;
pub mod quantize;


pub use matrix::{bayer_offset, BAYER_4X4};
pub use palette::{Palette, ParseColorError, Rgb};
pub use quantize::{classify, luma, map_rgba_in_place, QuantizeOptions};

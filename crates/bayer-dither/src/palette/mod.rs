//! Two-color palette and hex color parsing.

mod error;
#[allow(clippy::module_inception)]
mod palette;

pub use error::ParseColorError;
pub use palette::{Palette, Rgb};

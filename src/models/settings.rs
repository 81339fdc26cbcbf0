//! Processing settings.
//!
//! `Settings` is the externally owned configuration the frame processor
//! consumes as an immutable snapshot at the start of every pass. It maps
//! 1:1 onto the sliders and toggles of a configuration surface and can be
//! loaded from a YAML file.

use std::path::Path;

use bayer_dither::{Palette, QuantizeOptions};
use serde::{Deserialize, Serialize};

/// A complete settings snapshot for one processing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Downscale divisor; the effective output block size in display pixels.
    pub pixel_size: u32,

    /// Luminance cutoff (0..=255).
    pub threshold: u8,

    /// Dither matrix contribution (0.0..=1.0).
    pub dither_amount: f32,

    /// Contrast multiplier around the luminance midpoint.
    pub contrast: f32,

    /// Hex color assigned to dark-classified pixels.
    pub color_dark: String,

    /// Hex color assigned to light-classified pixels.
    pub color_light: String,

    /// Swap which palette color represents light vs dark.
    pub invert: bool,

    /// Overlay scanlines on the display output.
    pub grid_line: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pixel_size: 4,
            threshold: 128,
            dither_amount: 0.5,
            contrast: 1.0,
            color_dark: "#222323".to_string(),
            color_light: "#f0f6f0".to_string(),
            invert: false,
            grid_line: false,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    ///
    /// Unlike an optional embedded config, a settings file is requested
    /// explicitly, so read and parse failures are surfaced to the caller
    /// rather than silently replaced with defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// A copy with all fields clamped into their documented ranges.
    pub fn sanitized(&self) -> Self {
        let mut s = self.clone();
        s.pixel_size = s.pixel_size.max(1);
        s.dither_amount = s.dither_amount.clamp(0.0, 1.0);
        s.contrast = s.contrast.max(0.0);
        s
    }

    /// The two-color palette, resolved leniently.
    ///
    /// Malformed hex strings degrade to black; this is the compatibility
    /// behavior of the settings surface. Use
    /// [`Palette::try_from_hex`] for strict validation.
    pub fn palette(&self) -> Palette {
        Palette::from_hex(&self.color_dark, &self.color_light)
    }

    /// The quantizer configuration for this snapshot.
    pub fn quantize_options(&self) -> QuantizeOptions {
        QuantizeOptions::new()
            .threshold(self.threshold)
            .dither_amount(self.dither_amount)
            .contrast(self.contrast)
            .invert(self.invert)
    }
}

//! Built-in two-color palette presets.
//!
//! These are the palettes the configuration surface exposes as one-click
//! preset buttons. Applying a preset only rewrites the two color fields;
//! the invert flag keeps its render-time swap semantics.

use crate::models::Settings;

/// A named two-color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalettePreset {
    pub name: &'static str,
    pub dark: &'static str,
    pub light: &'static str,
}

/// The built-in presets, in display order.
pub const PALETTE_PRESETS: &[PalettePreset] = &[
    PalettePreset {
        name: "mono",
        dark: "#000000",
        light: "#ffffff",
    },
    PalettePreset {
        name: "paper",
        dark: "#222323",
        light: "#f0f6f0",
    },
    PalettePreset {
        name: "gameboy",
        dark: "#0f380f",
        light: "#9bbc0f",
    },
    PalettePreset {
        name: "phosphor",
        dark: "#001100",
        light: "#33ff66",
    },
    PalettePreset {
        name: "amber",
        dark: "#1a1006",
        light: "#ffb000",
    },
];

/// Look up a preset by name, case-insensitively.
pub fn find(name: &str) -> Option<&'static PalettePreset> {
    PALETTE_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

impl PalettePreset {
    /// Apply this preset's colors to a settings value.
    pub fn apply(&self, settings: &mut Settings) {
        settings.color_dark = self.dark.to_string();
        settings.color_light = self.light.to_string();
    }
}

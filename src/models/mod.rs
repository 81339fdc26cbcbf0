pub mod presets;
pub mod settings;

pub use presets::{find as find_preset, PalettePreset, PALETTE_PRESETS};
pub use settings::Settings;

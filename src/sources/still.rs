//! Still image source.

use std::path::Path;
use std::time::Duration;

use tiny_skia::Pixmap;

use crate::error::ProcessError;
use crate::rendering::surface;
use crate::sources::{FrameSource, SourceKind};

/// A single decoded image frame.
pub struct StillSource {
    pixmap: Pixmap,
}

impl StillSource {
    /// Decode an image file (PNG, JPEG, or the first frame of a GIF).
    pub fn open(path: &Path) -> Result<Self, ProcessError> {
        let decoded = image::open(path)
            .map_err(|e| ProcessError::SourceDecode(e.to_string()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        tracing::debug!(path = %path.display(), width, height, "Decoded still source");

        let pixmap = surface::rgba_to_pixmap(decoded.as_raw(), width, height)?;
        Ok(Self { pixmap })
    }

    /// Wrap an already decoded frame.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }
}

impl FrameSource for StillSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Still
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.pixmap.width(), self.pixmap.height()))
    }

    fn frame(&mut self, _elapsed: Duration) -> Option<&Pixmap> {
        Some(&self.pixmap)
    }
}

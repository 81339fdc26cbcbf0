//! The frame processor: one pipeline pass over the current source.
//!
//! A pass reads the source's current frame, renders it into a transient
//! low-resolution processing surface, quantizes every pixel onto the
//! two-color palette, and blits the result back up onto the display
//! surface. The processor owns the display surface exclusively; settings
//! arrive as an immutable snapshot per pass.

use std::time::Duration;

use bayer_dither::map_rgba_in_place;
use tiny_skia::Pixmap;

use crate::error::ProcessError;
use crate::models::Settings;
use crate::rendering::surface;
use crate::sources::{FrameSource, SourceKind};

/// What the processor is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// No source loaded; passes paint a placeholder and do no pixel work.
    Idle,
    /// Source selected but not yet decoded; passes re-poll without pixel work.
    Waiting,
    /// Static source; the pipeline runs once per (source, settings) change.
    ActiveStill,
    /// Playing source; the pipeline runs once per scheduler tick.
    ActiveContinuous,
}

/// Result of a single pass, telling the scheduler what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Placeholder painted; nothing to drive until a source arrives.
    Idle,
    /// Source dimensions unknown; skip the pixel work and retry next tick.
    NotReady,
    /// Display surface updated.
    Rendered,
}

/// Owns the display surface and drives the per-frame pipeline.
pub struct FrameProcessor {
    source: Option<Box<dyn FrameSource>>,
    display: Option<Pixmap>,
    container: (u32, u32),
    /// Bumped on every source change so schedulers and stale continuations
    /// can tell the surface they were armed for is gone.
    generation: u64,
}

impl FrameProcessor {
    /// Create a processor rendering into the given container area.
    pub fn new(container_width: u32, container_height: u32) -> Self {
        Self {
            source: None,
            display: None,
            container: (container_width, container_height),
            generation: 0,
        }
    }

    /// Resize the container; the display fit is recomputed on the next pass.
    pub fn set_container(&mut self, width: u32, height: u32) {
        self.container = (width, height);
    }

    /// Swap or clear the source. Bumps the processor generation.
    pub fn set_source(&mut self, source: Option<Box<dyn FrameSource>>) {
        self.source = source;
        self.generation = self.generation.wrapping_add(1);
        tracing::debug!(
            generation = self.generation,
            state = ?self.state(),
            "Source changed"
        );
    }

    /// Monotonic source-change counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current state, derived from the source.
    pub fn state(&self) -> ProcessorState {
        match &self.source {
            None => ProcessorState::Idle,
            Some(source) => match (source.dimensions(), source.kind()) {
                (None, _) => ProcessorState::Waiting,
                (Some(_), SourceKind::Still) => ProcessorState::ActiveStill,
                (Some(_), SourceKind::Continuous) => ProcessorState::ActiveContinuous,
            },
        }
    }

    /// The display surface, once at least one pass has painted it.
    pub fn display(&self) -> Option<&Pixmap> {
        self.display.as_ref()
    }

    /// Ensure the display surface exists at `(width, height)`.
    ///
    /// Reallocates only when the fitted size actually changed, so an
    /// unchanged layout never flickers through a fresh surface.
    fn ensure_display(&mut self, width: u32, height: u32) -> Result<&mut Pixmap, ProcessError> {
        let needs_alloc = !matches!(
            &self.display,
            Some(d) if d.width() == width && d.height() == height
        );
        if needs_alloc {
            self.display = Some(Pixmap::new(width, height).ok_or(ProcessError::PixmapAllocation)?);
            tracing::debug!(width, height, "Display surface resized");
        }
        self.display.as_mut().ok_or(ProcessError::PixmapAllocation)
    }

    /// Run one pipeline pass.
    ///
    /// `elapsed` is the playback clock continuous sources are sampled at.
    /// Settings are sanitized and read once up front; nothing tears
    /// mid-pass. Errors are transient: the display keeps its previous
    /// content and the next attempt proceeds normally.
    pub fn process_pass(
        &mut self,
        settings: &Settings,
        elapsed: Duration,
    ) -> Result<PassOutcome, ProcessError> {
        let settings = settings.sanitized();
        let palette = settings.palette();

        if self.source.is_none() {
            // Placeholder: the empty player region in the dark palette tone
            let (cw, ch) = self.container;
            let display = self.ensure_display(cw.max(1), ch.max(1))?;
            surface::fill_solid(display, palette.resolve(settings.invert).0);
            return Ok(PassOutcome::Idle);
        }

        let dimensions = self.source.as_ref().and_then(|s| s.dimensions());
        let Some((source_w, source_h)) = dimensions else {
            return Ok(PassOutcome::NotReady);
        };
        if source_w == 0 || source_h == 0 {
            return Ok(PassOutcome::NotReady);
        }

        let (display_w, display_h) = surface::fit_container((source_w, source_h), self.container);
        let factor = settings.pixel_size.max(1);
        let proc_w = (display_w / factor).max(1);
        let proc_h = (display_h / factor).max(1);

        let frame = match self.source.as_mut().and_then(|s| s.frame(elapsed)) {
            Some(frame) => frame,
            None => return Ok(PassOutcome::NotReady),
        };

        // Downscale into a transient processing surface, quantize its
        // pixels, then blit back up without smoothing.
        let mut proc = surface::downscale(frame, proc_w, proc_h)?;
        let mut rgba = surface::pixmap_to_rgba(&proc);
        map_rgba_in_place(
            &mut rgba,
            proc_w,
            proc_h,
            &palette,
            &settings.quantize_options(),
        );
        // Every quantized pixel is opaque, so the straight bytes are
        // already valid premultiplied data.
        proc.data_mut().copy_from_slice(&rgba);

        let grid_line = settings.grid_line;
        let display = self.ensure_display(display_w, display_h)?;
        surface::blit_nearest(&proc, display);
        if grid_line {
            surface::overlay_scanlines(display);
        }

        Ok(PassOutcome::Rendered)
    }
}

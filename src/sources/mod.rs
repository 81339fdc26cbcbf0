//! Frame sources: the decoded visuals the processor consumes.
//!
//! A source is an opaque decodable visual with queryable intrinsic
//! dimensions. Dimensions are `None` until decode metadata is available;
//! the processor re-polls without doing pixel work until then. How a
//! source was chosen (file dialog, drag and drop, CLI argument) is a
//! collaborator concern outside this crate's scope.

use std::time::Duration;

use tiny_skia::Pixmap;

pub mod animation;
pub mod still;

pub use animation::AnimationSource;
pub use still::StillSource;

/// Whether a source yields one frame or a stream of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A static image: the pipeline runs once per (source, settings) change.
    Still,
    /// A playing animation: the pipeline runs every display-refresh tick.
    Continuous,
}

/// A decoded visual the frame processor can sample.
pub trait FrameSource: Send {
    fn kind(&self) -> SourceKind;

    /// Intrinsic pixel dimensions, `None` until decoded metadata is ready.
    /// Both components are nonzero once `Some`.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// The current decoded frame for the given playback clock position.
    ///
    /// Continuous sources pick the frame the clock has reached (looping);
    /// still sources ignore the clock. Returns `None` while the source is
    /// not ready. Not every decoded frame is guaranteed to be visited:
    /// frame skipping under load is acceptable.
    fn frame(&mut self, elapsed: Duration) -> Option<&Pixmap>;
}

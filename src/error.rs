use thiserror::Error;

/// Errors from a single processing pass.
///
/// A pass failure is transient by design: the caller drops the frame and,
/// for continuous sources, the next scheduled pass proceeds normally.
/// "Source not ready" is deliberately not an error; it is a
/// [`PassOutcome`](crate::rendering::PassOutcome) the scheduler reacts to.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to allocate pixmap")]
    PixmapAllocation,

    #[error("Source decode error: {0}")]
    SourceDecode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the capture surface (still PNG export and stream capture).
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The environment cannot support this capture operation at all.
    /// Fatal to the capture only; the processing pipeline is unaffected.
    #[error("Capture not supported: {0}")]
    Unsupported(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

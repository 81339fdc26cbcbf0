pub mod capture;
pub mod encoder;
pub mod frame_loop;

pub use capture::{encode_display_png, FrameSink, StreamCapture, SAMPLE_RATE};
pub use encoder::{FfmpegSink, PngSequenceSink};
pub use frame_loop::{FrameLoop, SharedProcessor};

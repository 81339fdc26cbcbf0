pub mod processor;
pub mod surface;

pub use processor::{FrameProcessor, PassOutcome, ProcessorState};

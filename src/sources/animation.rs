//! Animated (continuous) source.
//!
//! Frames are fully decoded up front; playback is a pure function of the
//! clock the processor passes in, which keeps sampling deterministic and
//! cheap inside the frame loop.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use tiny_skia::Pixmap;

use crate::error::ProcessError;
use crate::rendering::surface;
use crate::sources::{FrameSource, SourceKind};

/// Zero-delay GIF frames are treated like browsers treat them.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(10);

/// A decoded animation, sampled by playback clock, looping.
pub struct AnimationSource {
    /// Frame pixmaps with the clock position at which each frame ends.
    frames: Vec<(Pixmap, Duration)>,
    total: Duration,
}

impl AnimationSource {
    /// Decode an animated GIF file.
    pub fn open(path: &Path) -> Result<Self, ProcessError> {
        let file = File::open(path)?;
        let decoder = GifDecoder::new(BufReader::new(file))
            .map_err(|e| ProcessError::SourceDecode(e.to_string()))?;

        let mut frames = Vec::new();
        let mut total = Duration::ZERO;
        for frame in decoder.into_frames() {
            let frame = frame.map_err(|e| ProcessError::SourceDecode(e.to_string()))?;
            let delay = Duration::from(frame.delay()).max(MIN_FRAME_DELAY);
            let buffer = frame.into_buffer();
            let (width, height) = buffer.dimensions();
            let pixmap = surface::rgba_to_pixmap(buffer.as_raw(), width, height)?;
            total += delay;
            frames.push((pixmap, total));
        }
        if frames.is_empty() {
            return Err(ProcessError::SourceDecode(
                "animation has no frames".to_string(),
            ));
        }

        tracing::debug!(
            path = %path.display(),
            frames = frames.len(),
            duration_ms = total.as_millis() as u64,
            "Decoded animation source"
        );
        Ok(Self { frames, total })
    }

    /// Build from pre-decoded frames with per-frame delays (test hook and
    /// external decoder integration point).
    pub fn from_frames(frames: Vec<(Pixmap, Duration)>) -> Self {
        let mut out = Vec::with_capacity(frames.len());
        let mut total = Duration::ZERO;
        for (pixmap, delay) in frames {
            total += delay.max(MIN_FRAME_DELAY);
            out.push((pixmap, total));
        }
        Self { frames: out, total }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn duration(&self) -> Duration {
        self.total
    }
}

impl FrameSource for AnimationSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Continuous
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames
            .first()
            .map(|(p, _)| (p.width(), p.height()))
            .filter(|&(w, h)| w > 0 && h > 0)
    }

    fn frame(&mut self, elapsed: Duration) -> Option<&Pixmap> {
        if self.frames.is_empty() {
            return None;
        }
        let position = if self.total.is_zero() {
            Duration::ZERO
        } else {
            Duration::from_nanos((elapsed.as_nanos() % self.total.as_nanos()) as u64)
        };
        let index = self
            .frames
            .iter()
            .position(|(_, end)| position < *end)
            .unwrap_or(self.frames.len() - 1);
        Some(&self.frames[index].0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> Pixmap {
        let data = [value, value, value, 255].repeat((width * height) as usize);
        surface::rgba_to_pixmap(&data, width, height).unwrap()
    }

    fn sample_value(pixmap: &Pixmap) -> u8 {
        pixmap.pixels()[0].demultiply().red()
    }

    #[test]
    fn test_frame_selection_follows_clock() {
        let mut source = AnimationSource::from_frames(vec![
            (solid(4, 4, 10), Duration::from_millis(100)),
            (solid(4, 4, 20), Duration::from_millis(100)),
            (solid(4, 4, 30), Duration::from_millis(100)),
        ]);

        assert_eq!(source.kind(), SourceKind::Continuous);
        assert_eq!(source.dimensions(), Some((4, 4)));
        assert_eq!(source.duration(), Duration::from_millis(300));

        let cases = [
            (Duration::from_millis(0), 10),
            (Duration::from_millis(99), 10),
            (Duration::from_millis(150), 20),
            (Duration::from_millis(250), 30),
        ];
        for (elapsed, expected) in cases {
            let frame = source.frame(elapsed).unwrap();
            assert_eq!(
                sample_value(frame),
                expected,
                "wrong frame at {elapsed:?}"
            );
        }
    }

    #[test]
    fn test_playback_loops() {
        let mut source = AnimationSource::from_frames(vec![
            (solid(2, 2, 10), Duration::from_millis(100)),
            (solid(2, 2, 20), Duration::from_millis(100)),
        ]);

        // 450ms into a 200ms loop lands 50ms in: first frame again
        let frame = source.frame(Duration::from_millis(450)).unwrap();
        assert_eq!(sample_value(frame), 10);
    }

    #[test]
    fn test_zero_delays_are_clamped() {
        let source = AnimationSource::from_frames(vec![
            (solid(2, 2, 10), Duration::ZERO),
            (solid(2, 2, 20), Duration::ZERO),
        ]);
        assert!(
            !source.duration().is_zero(),
            "zero-delay frames must not collapse the loop to zero length"
        );
    }
}

//! Display capture: still PNG export and the 30 fps stream sampler.
//!
//! Still capture is synchronous and valid any time after one completed
//! pass. Stream capture samples the display surface at a fixed rate into
//! a [`FrameSink`] collaborator; the sink is what turns raw frames into a
//! container file, and whether one is available at all is an environment
//! question the pipeline itself stays unaffected by.

use std::io::Cursor;

use tiny_skia::Pixmap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::CaptureError;
use crate::rendering::surface;
use crate::services::frame_loop::SharedProcessor;

/// Fixed stream sample rate, in frames per second.
pub const SAMPLE_RATE: u32 = 30;

/// Consumer of raw RGBA frames at the fixed sample rate.
///
/// Implementations package the stream into a container file (or a frame
/// sequence). `open` is called once with the stream geometry before the
/// first `write_frame`.
pub trait FrameSink: Send + 'static {
    fn open(&mut self, width: u32, height: u32) -> anyhow::Result<()>;
    fn write_frame(&mut self, rgba: &[u8]) -> anyhow::Result<()>;
    fn finish(&mut self) -> anyhow::Result<()>;
}

/// Encode the display surface's current content as a lossless PNG.
///
/// Display pixels are always opaque, so the output is truecolor RGB.
pub fn encode_display_png(display: &Pixmap) -> Result<Vec<u8>, CaptureError> {
    let mut rgb = Vec::with_capacity((display.width() * display.height() * 3) as usize);
    for p in display.pixels() {
        let c = p.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    encode_rgb_png(&rgb, display.width(), display.height())
}

/// Encode packed RGB rows as a PNG byte vector.
pub(crate) fn encode_rgb_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| CaptureError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(rgb)
            .map_err(|e| CaptureError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// A running stream capture: the display surface sampled at
/// [`SAMPLE_RATE`] into a sink until stopped.
pub struct StreamCapture {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<Result<u64, CaptureError>>,
}

impl StreamCapture {
    /// Start sampling the processor's display surface.
    ///
    /// Sampling skips ticks while no pass has painted the display yet and
    /// while the display geometry differs from the sink's opened geometry
    /// (frame drops are acceptable; out-of-order frames are not). The sink
    /// is opened lazily on the first sampled frame.
    pub fn start(processor: SharedProcessor, sink: Box<dyn FrameSink>) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_capture(processor, sink, shutdown_rx));
        tracing::info!(fps = SAMPLE_RATE, "Stream capture started");
        Self { shutdown, handle }
    }

    /// Stop sampling, finalize the sink, and return the frame count.
    pub async fn stop(self) -> Result<u64, CaptureError> {
        let _ = self.shutdown.send(true);
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(CaptureError::Encoder(format!(
                "capture task failed: {e}"
            ))),
        }
    }
}

async fn run_capture(
    processor: SharedProcessor,
    mut sink: Box<dyn FrameSink>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<u64, CaptureError> {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1) / SAMPLE_RATE);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut geometry: Option<(u32, u32)> = None;
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                // Hold the lock only long enough to copy the pixels out;
                // the frame loop must keep its tick cadence.
                let sample = {
                    let proc = processor.lock().await;
                    proc.display().map(|d| (surface::pixmap_to_rgba(d), d.width(), d.height()))
                };
                let Some((rgba, width, height)) = sample else {
                    continue;
                };

                match geometry {
                    None => {
                        sink.open(width, height)
                            .map_err(|e| CaptureError::Encoder(e.to_string()))?;
                        geometry = Some((width, height));
                    }
                    Some(g) if g != (width, height) => {
                        // The display was re-fit mid-capture; the stream
                        // geometry is fixed, so this sample is dropped.
                        tracing::warn!(
                            expected = ?g,
                            actual = ?(width, height),
                            "Display resized during capture, dropping frame"
                        );
                        continue;
                    }
                    Some(_) => {}
                }

                sink.write_frame(&rgba)
                    .map_err(|e| CaptureError::Encoder(e.to_string()))?;
                frames += 1;
            }
        }
    }

    sink.finish()
        .map_err(|e| CaptureError::Encoder(e.to_string()))?;
    tracing::info!(frames, "Stream capture finished");
    Ok(frames)
}

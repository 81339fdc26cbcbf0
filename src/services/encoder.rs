//! External encoder sinks for stream capture.
//!
//! `FfmpegSink` pipes raw RGBA frames into a system `ffmpeg` process,
//! which packages them into whatever container the output extension
//! names. `PngSequenceSink` writes numbered stills for environments
//! without an encoder.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::{bail, Context};

use crate::error::CaptureError;
use crate::services::capture::{encode_rgb_png, FrameSink};

/// Pipes raw frames into a system `ffmpeg` process.
pub struct FfmpegSink {
    output: PathBuf,
    fps: u32,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegSink {
    /// Create a sink writing to `output` at `fps`.
    ///
    /// Probes for the `ffmpeg` binary up front so an unsupported
    /// environment fails the capture before any frame work starts.
    pub fn create(output: &Path, fps: u32) -> Result<Self, CaptureError> {
        match Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CaptureError::Unsupported(
                    "ffmpeg executable not found in PATH".to_string(),
                ));
            }
            Err(e) => return Err(CaptureError::Io(e)),
        }

        Ok(Self {
            output: output.to_path_buf(),
            fps,
            child: None,
            stdin: None,
        })
    }
}

impl FrameSink for FfmpegSink {
    fn open(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        let mut child = Command::new("ffmpeg")
            .args([
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{width}x{height}"),
                "-r",
                &self.fps.to_string(),
                "-i",
                "-",
                // Pad to even dimensions; yuv420p requires them
                "-vf",
                "pad=ceil(iw/2)*2:ceil(ih/2)*2",
                "-pix_fmt",
                "yuv420p",
                "-y",
            ])
            .arg(&self.output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn ffmpeg")?;

        self.stdin = child.stdin.take();
        self.child = Some(child);
        tracing::debug!(output = %self.output.display(), width, height, "ffmpeg encoder opened");
        Ok(())
    }

    fn write_frame(&mut self, rgba: &[u8]) -> anyhow::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .context("encoder not opened before first frame")?;
        stdin
            .write_all(rgba)
            .context("failed to write frame to ffmpeg")
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        // Close stdin so ffmpeg flushes and exits
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let status = child.wait().context("ffmpeg did not exit")?;
            if !status.success() {
                bail!("ffmpeg exited with status {status}");
            }
        }
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // A dropped-but-unfinished sink must not leave a zombie encoder
        if let Some(mut child) = self.child.take() {
            drop(self.stdin.take());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Writes each sampled frame as a numbered PNG in a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    geometry: Option<(u32, u32)>,
    index: u64,
}

impl PngSequenceSink {
    pub fn create(dir: &Path) -> Result<Self, CaptureError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            geometry: None,
            index: 0,
        })
    }
}

impl FrameSink for PngSequenceSink {
    fn open(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        self.geometry = Some((width, height));
        Ok(())
    }

    fn write_frame(&mut self, rgba: &[u8]) -> anyhow::Result<()> {
        let (width, height) = self
            .geometry
            .context("sink not opened before first frame")?;
        let rgb: Vec<u8> = rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let bytes = encode_rgb_png(&rgb, width, height)?;
        let path = self.dir.join(format!("frame-{:05}.png", self.index));
        std::fs::write(&path, bytes)?;
        self.index += 1;
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        tracing::debug!(dir = %self.dir.display(), frames = self.index, "PNG sequence finished");
        Ok(())
    }
}

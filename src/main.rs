use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bayer_dither::Rgb;
use clap::{Args, Parser, Subcommand};
use tokio::sync::{watch, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retrotone::models::{self, Settings, PALETTE_PRESETS};
use retrotone::rendering::FrameProcessor;
use retrotone::services::{
    encode_display_png, FfmpegSink, FrameLoop, FrameSink, PngSequenceSink, StreamCapture,
    SAMPLE_RATE,
};
use retrotone::sources::{AnimationSource, FrameSource, StillSource};

#[derive(Parser)]
#[command(name = "retrotone")]
#[command(about = "Two-tone retro-fication for still images and animations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an image once and write the result as a PNG
    Render {
        /// Input image (PNG, JPEG, or the first frame of a GIF)
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Display container size as WIDTHxHEIGHT (defaults to source size)
        #[arg(long)]
        container: Option<String>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Drive the frame loop over an input and record the display stream
    Record {
        /// Input image or animated GIF
        input: PathBuf,

        /// Output video file (requires ffmpeg in PATH)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write numbered PNG frames to this directory instead of a video
        #[arg(long)]
        frames_dir: Option<PathBuf>,

        /// Recording length in seconds
        #[arg(long, default_value_t = 5.0)]
        duration: f64,

        /// Display container size as WIDTHxHEIGHT (defaults to source size)
        #[arg(long)]
        container: Option<String>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// List the built-in palette presets
    Presets,
}

/// Settings sources and per-field overrides, lowest to highest precedence:
/// settings file, palette preset, individual flags.
#[derive(Args)]
struct TuningArgs {
    /// Settings file (YAML)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Palette preset name (see `presets`)
    #[arg(long)]
    preset: Option<String>,

    /// Downscale divisor (output block size)
    #[arg(long)]
    pixel_size: Option<u32>,

    /// Luminance cutoff (0-255)
    #[arg(long)]
    threshold: Option<u8>,

    /// Dither amount (0.0-1.0)
    #[arg(long)]
    dither: Option<f32>,

    /// Contrast multiplier
    #[arg(long)]
    contrast: Option<f32>,

    /// Dark palette color as #RRGGBB
    #[arg(long)]
    dark: Option<String>,

    /// Light palette color as #RRGGBB
    #[arg(long)]
    light: Option<String>,

    /// Swap the palette colors
    #[arg(long)]
    invert: bool,

    /// Overlay scanlines
    #[arg(long)]
    scanlines: bool,
}

impl TuningArgs {
    fn resolve(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(name) = &self.preset {
            let preset = models::find_preset(name)
                .ok_or_else(|| anyhow::anyhow!("unknown preset: {name}"))?;
            preset.apply(&mut settings);
        }

        if let Some(v) = self.pixel_size {
            settings.pixel_size = v;
        }
        if let Some(v) = self.threshold {
            settings.threshold = v;
        }
        if let Some(v) = self.dither {
            settings.dither_amount = v;
        }
        if let Some(v) = self.contrast {
            settings.contrast = v;
        }
        // The CLI is the strict-validation surface: a mistyped color is
        // reported here instead of silently rendering black.
        if let Some(v) = &self.dark {
            v.parse::<Rgb>()
                .map_err(|e| anyhow::anyhow!("invalid --dark color {v:?}: {e}"))?;
            settings.color_dark = v.clone();
        }
        if let Some(v) = &self.light {
            v.parse::<Rgb>()
                .map_err(|e| anyhow::anyhow!("invalid --light color {v:?}: {e}"))?;
            settings.color_light = v.clone();
        }
        if self.invert {
            settings.invert = true;
        }
        if self.scanlines {
            settings.grid_line = true;
        }

        Ok(settings.sanitized())
    }
}

fn parse_container(s: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("expected WIDTHxHEIGHT, got {s:?}"))?;
    Ok((w.trim().parse()?, h.trim().parse()?))
}

fn open_source(path: &Path) -> anyhow::Result<Box<dyn FrameSource>> {
    let is_gif = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gif"))
        .unwrap_or(false);
    Ok(if is_gif {
        Box::new(AnimationSource::open(path)?)
    } else {
        Box::new(StillSource::open(path)?)
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retrotone=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            input,
            output,
            container,
            tuning,
        } => run_render_command(&input, &output, container.as_deref(), &tuning),
        Commands::Record {
            input,
            output,
            frames_dir,
            duration,
            container,
            tuning,
        } => {
            run_record_command(
                &input,
                output.as_deref(),
                frames_dir.as_deref(),
                duration,
                container.as_deref(),
                &tuning,
            )
            .await
        }
        Commands::Presets => {
            run_presets_command();
            Ok(())
        }
    }
}

/// Process a still image once and write the display surface as a PNG.
fn run_render_command(
    input: &Path,
    output: &Path,
    container: Option<&str>,
    tuning: &TuningArgs,
) -> anyhow::Result<()> {
    let settings = tuning.resolve()?;
    let source = StillSource::open(input)?;
    let (source_w, source_h) = source
        .dimensions()
        .ok_or_else(|| anyhow::anyhow!("source has no dimensions"))?;
    let (container_w, container_h) = match container {
        Some(s) => parse_container(s)?,
        None => (source_w, source_h),
    };

    let mut processor = FrameProcessor::new(container_w, container_h);
    processor.set_source(Some(Box::new(source)));
    processor.process_pass(&settings, Duration::ZERO)?;

    let pixmap = processor
        .display()
        .ok_or_else(|| anyhow::anyhow!("no display content after processing"))?;
    let png_bytes = encode_display_png(pixmap)?;
    std::fs::write(output, png_bytes)?;
    tracing::info!(
        output = %output.display(),
        width = pixmap.width(),
        height = pixmap.height(),
        "Wrote still capture"
    );
    Ok(())
}

/// Run the frame loop over the input and record the display stream.
async fn run_record_command(
    input: &Path,
    output: Option<&Path>,
    frames_dir: Option<&Path>,
    duration: f64,
    container: Option<&str>,
    tuning: &TuningArgs,
) -> anyhow::Result<()> {
    let settings = tuning.resolve()?;
    let source = open_source(input)?;
    let (source_w, source_h) = source
        .dimensions()
        .ok_or_else(|| anyhow::anyhow!("source has no dimensions"))?;
    let (container_w, container_h) = match container {
        Some(s) => parse_container(s)?,
        None => (source_w, source_h),
    };

    let sink: Box<dyn FrameSink> = match (output, frames_dir) {
        (Some(path), None) => Box::new(FfmpegSink::create(path, SAMPLE_RATE)?),
        (None, Some(dir)) => Box::new(PngSequenceSink::create(dir)?),
        _ => anyhow::bail!("exactly one of --output or --frames-dir is required"),
    };

    let mut processor = FrameProcessor::new(container_w, container_h);
    processor.set_source(Some(source));
    let processor = Arc::new(Mutex::new(processor));

    let (settings_tx, settings_rx) = watch::channel(settings);
    let frame_loop = FrameLoop::spawn(processor.clone(), settings_rx);
    let capture = StreamCapture::start(processor.clone(), sink);

    tokio::time::sleep(Duration::from_secs_f64(duration.max(0.0))).await;

    let frames = capture.stop().await?;
    frame_loop.shutdown().await;
    drop(settings_tx);

    tracing::info!(frames, "Recording complete");
    Ok(())
}

fn run_presets_command() {
    for preset in PALETTE_PRESETS {
        println!(
            "{:10} dark {}  light {}",
            preset.name, preset.dark, preset.light
        );
    }
}

//! Common test infrastructure for retrotone integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tiny_skia::Pixmap;

use retrotone::rendering::surface;
use retrotone::services::FrameSink;
use retrotone::sources::{FrameSource, SourceKind};

/// A solid-color opaque pixmap.
pub fn solid_pixmap(width: u32, height: u32, value: u8) -> Pixmap {
    let data = [value, value, value, 255].repeat((width * height) as usize);
    surface::rgba_to_pixmap(&data, width, height).expect("fixture pixmap")
}

/// A source whose readiness is controlled from the outside and which
/// counts how many times it was sampled.
pub struct ControlledSource {
    kind: SourceKind,
    pixmap: Pixmap,
    ready: Arc<AtomicBool>,
    samples: Arc<AtomicU64>,
}

impl ControlledSource {
    pub fn new(kind: SourceKind, pixmap: Pixmap) -> (Self, SourceHandle) {
        let ready = Arc::new(AtomicBool::new(true));
        let samples = Arc::new(AtomicU64::new(0));
        let handle = SourceHandle {
            ready: ready.clone(),
            samples: samples.clone(),
        };
        (
            Self {
                kind,
                pixmap,
                ready,
                samples,
            },
            handle,
        )
    }

    pub fn pending(kind: SourceKind, pixmap: Pixmap) -> (Self, SourceHandle) {
        let (source, handle) = Self::new(kind, pixmap);
        handle.ready.store(false, Ordering::SeqCst);
        (source, handle)
    }
}

/// External control over a [`ControlledSource`] that was moved into a
/// processor.
#[derive(Clone)]
pub struct SourceHandle {
    ready: Arc<AtomicBool>,
    samples: Arc<AtomicU64>,
}

impl SourceHandle {
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::SeqCst)
    }
}

impl FrameSource for ControlledSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.ready
            .load(Ordering::SeqCst)
            .then(|| (self.pixmap.width(), self.pixmap.height()))
    }

    fn frame(&mut self, _elapsed: Duration) -> Option<&Pixmap> {
        if !self.ready.load(Ordering::SeqCst) {
            return None;
        }
        self.samples.fetch_add(1, Ordering::SeqCst);
        Some(&self.pixmap)
    }
}

/// Shared record of what a [`CountingSink`] observed.
#[derive(Debug, Default)]
pub struct SinkLog {
    pub opened: Option<(u32, u32)>,
    pub frames: u64,
    pub finished: bool,
}

/// A frame sink that records everything it is fed.
pub struct CountingSink {
    log: Arc<Mutex<SinkLog>>,
}

impl CountingSink {
    pub fn new() -> (Self, Arc<Mutex<SinkLog>>) {
        let log = Arc::new(Mutex::new(SinkLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl FrameSink for CountingSink {
    fn open(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        self.log.lock().unwrap().opened = Some((width, height));
        Ok(())
    }

    fn write_frame(&mut self, _rgba: &[u8]) -> anyhow::Result<()> {
        self.log.lock().unwrap().frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.log.lock().unwrap().finished = true;
        Ok(())
    }
}

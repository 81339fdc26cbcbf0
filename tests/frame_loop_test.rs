//! Frame loop scheduling semantics: still-once, continuous-every-tick,
//! waiting re-poll, and cancellation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use common::{solid_pixmap, ControlledSource};
use retrotone::models::Settings;
use retrotone::rendering::FrameProcessor;
use retrotone::services::FrameLoop;
use retrotone::sources::SourceKind;

/// Long enough for many 60 Hz ticks without making the suite slow.
const SETTLE: Duration = Duration::from_millis(250);

fn shared_processor(source: Option<Box<dyn retrotone::sources::FrameSource>>) -> Arc<Mutex<FrameProcessor>> {
    let mut processor = FrameProcessor::new(32, 32);
    if let Some(source) = source {
        processor.set_source(Some(source));
    }
    Arc::new(Mutex::new(processor))
}

#[tokio::test]
async fn still_source_runs_exactly_once_until_settings_change() {
    let (source, handle) = ControlledSource::new(SourceKind::Still, solid_pixmap(16, 16, 128));
    let processor = shared_processor(Some(Box::new(source)));
    let (settings_tx, settings_rx) = watch::channel(Settings::default());

    let frame_loop = FrameLoop::spawn(processor.clone(), settings_rx);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(
        handle.samples(),
        1,
        "a still source must be sampled exactly once per settings state"
    );

    // A settings change re-triggers exactly one more pass
    settings_tx
        .send(Settings {
            threshold: 99,
            ..Settings::default()
        })
        .unwrap();
    tokio::time::sleep(SETTLE).await;
    assert_eq!(handle.samples(), 2);

    frame_loop.shutdown().await;
}

#[tokio::test]
async fn continuous_source_runs_every_tick() {
    let (source, handle) = ControlledSource::new(SourceKind::Continuous, solid_pixmap(16, 16, 128));
    let processor = shared_processor(Some(Box::new(source)));
    let (_settings_tx, settings_rx) = watch::channel(Settings::default());

    let frame_loop = FrameLoop::spawn(processor.clone(), settings_rx);
    tokio::time::sleep(SETTLE).await;

    let sampled = handle.samples();
    assert!(
        sampled >= 5,
        "continuous source must be re-sampled every refresh tick, got {sampled}"
    );

    frame_loop.shutdown().await;
}

#[tokio::test]
async fn waiting_source_starts_rendering_once_ready() {
    let (source, handle) =
        ControlledSource::pending(SourceKind::Continuous, solid_pixmap(16, 16, 128));
    let processor = shared_processor(Some(Box::new(source)));
    let (_settings_tx, settings_rx) = watch::channel(Settings::default());

    let frame_loop = FrameLoop::spawn(processor.clone(), settings_rx);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(handle.samples(), 0, "not-ready source must not be sampled");
    assert!(
        processor.lock().await.display().is_none(),
        "no pass may paint before the source is ready"
    );

    // The loop kept re-polling, so readiness is picked up without any
    // external re-trigger
    handle.set_ready(true);
    tokio::time::sleep(SETTLE).await;
    assert!(handle.samples() > 0, "ready source must start rendering");
    assert!(processor.lock().await.display().is_some());

    frame_loop.shutdown().await;
}

#[tokio::test]
async fn shutdown_cancels_pending_continuations() {
    let (source, handle) = ControlledSource::new(SourceKind::Continuous, solid_pixmap(16, 16, 128));
    let processor = shared_processor(Some(Box::new(source)));
    let (_settings_tx, settings_rx) = watch::channel(Settings::default());

    let frame_loop = FrameLoop::spawn(processor.clone(), settings_rx);
    tokio::time::sleep(SETTLE).await;
    frame_loop.shutdown().await;

    let frozen = handle.samples();
    tokio::time::sleep(SETTLE).await;
    assert_eq!(
        handle.samples(),
        frozen,
        "no pass may execute after shutdown resolved"
    );
}

#[tokio::test]
async fn dropping_the_handle_stops_the_loop() {
    let (source, handle) = ControlledSource::new(SourceKind::Continuous, solid_pixmap(16, 16, 128));
    let processor = shared_processor(Some(Box::new(source)));
    let (_settings_tx, settings_rx) = watch::channel(Settings::default());

    let frame_loop = FrameLoop::spawn(processor.clone(), settings_rx);
    tokio::time::sleep(SETTLE).await;
    drop(frame_loop);

    // Give the task a moment to observe the closed shutdown channel
    tokio::time::sleep(SETTLE).await;
    let frozen = handle.samples();
    tokio::time::sleep(SETTLE).await;
    assert_eq!(handle.samples(), frozen, "a dropped handle must cancel the loop");
}

#[tokio::test]
async fn clearing_the_source_returns_to_idle() {
    let (source, handle) = ControlledSource::new(SourceKind::Continuous, solid_pixmap(16, 16, 128));
    let processor = shared_processor(Some(Box::new(source)));
    let (_settings_tx, settings_rx) = watch::channel(Settings::default());

    let frame_loop = FrameLoop::spawn(processor.clone(), settings_rx);
    tokio::time::sleep(SETTLE).await;
    assert!(handle.samples() > 0);

    processor.lock().await.set_source(None);
    tokio::time::sleep(SETTLE).await;
    let frozen = handle.samples();
    tokio::time::sleep(SETTLE).await;
    assert_eq!(
        handle.samples(),
        frozen,
        "a cleared source must not be sampled again"
    );

    frame_loop.shutdown().await;
}

//! The display-refresh frame loop.
//!
//! Cooperative scheduling on the tokio runtime: one task drives the
//! processor at display-refresh cadence. Each pass runs to completion
//! under the processor lock before the next is scheduled, so passes never
//! overlap and always execute in tick order. Settings are snapshotted
//! from a watch channel at the start of every pass.
//!
//! Cancellation is explicit: [`FrameLoop::shutdown`] resolves only after
//! the task has stopped, so no stale pass can run against a replaced or
//! freed surface. Dropping the handle cancels as well (the shutdown
//! channel closes).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::models::Settings;
use crate::rendering::{FrameProcessor, PassOutcome, ProcessorState};

/// Shared processor handle, locked per pass.
pub type SharedProcessor = Arc<Mutex<FrameProcessor>>;

/// Handle to a running frame loop task.
pub struct FrameLoop {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl FrameLoop {
    /// Display refresh cadence the loop re-arms itself at (~60 Hz).
    pub const REFRESH_INTERVAL: Duration = Duration::from_micros(16_667);

    /// Spawn the loop task.
    ///
    /// Still sources run exactly once per (source, settings) change and
    /// then park; continuous sources re-run every tick; waiting sources
    /// re-poll every tick without pixel work. Pass errors are transient
    /// frame drops: logged, never escalated.
    pub fn spawn(processor: SharedProcessor, settings: watch::Receiver<Settings>) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(processor, settings, shutdown_rx));
        Self { shutdown, handle }
    }

    /// Cancel the loop and wait for the task to stop.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }

    /// Whether the loop task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

async fn run_loop(
    processor: SharedProcessor,
    mut settings: watch::Receiver<Settings>,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = Instant::now();
    let mut ticker = tokio::time::interval(FrameLoop::REFRESH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Armed means the next tick runs a pass. Parked still sources re-arm
    // on a settings change or a source generation bump.
    let mut armed = true;
    let mut seen_generation: Option<u64> = None;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            changed = settings.changed() => {
                match changed {
                    Ok(()) => armed = true,
                    // Settings owner gone: the view is being torn down
                    Err(_) => break,
                }
            }
            _ = ticker.tick() => {
                let snapshot = settings.borrow().clone();
                let mut proc = processor.lock().await;

                if seen_generation != Some(proc.generation()) {
                    seen_generation = Some(proc.generation());
                    armed = true;
                }
                if !armed {
                    continue;
                }

                match proc.process_pass(&snapshot, start.elapsed()) {
                    Ok(PassOutcome::Rendered) => {
                        armed = proc.state() == ProcessorState::ActiveContinuous;
                    }
                    Ok(PassOutcome::NotReady) => {
                        // Keep polling until the source decodes
                        armed = true;
                    }
                    Ok(PassOutcome::Idle) => {
                        armed = false;
                    }
                    Err(e) => {
                        // Transient frame drop; continuous sources retry
                        tracing::warn!(error = %e, "Frame pass dropped");
                        armed = proc.state() == ProcessorState::ActiveContinuous;
                    }
                }
            }
        }
    }
    tracing::debug!("Frame loop stopped");
}

//! Background cache sweeping
//!
//! Stale weather entries are ignored on read but never removed by it. A host
//! that keeps the cache around for a long time can spawn a sweeper that
//! periodically drops stale entries, so memory tracks the set of points that
//! are actually being looked at.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::{Clock, WeatherCache};

/// Configuration for the sweeper
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between sweeps
    pub interval: Duration,
    /// Whether the sweeper runs at all
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            enabled: false,
        }
    }
}

/// Handle for controlling the background sweeper
#[derive(Debug)]
pub struct SweepHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Spawns the sweeper on the current tokio runtime
    ///
    /// With `enabled = false` no task is spawned and the handle is inert.
    pub fn spawn(cache: Arc<WeatherCache>, clock: Arc<dyn Clock>, config: SweepConfig) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = config.enabled.then(|| {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.interval);
                // Skip the first tick (immediate)
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let removed = cache.sweep(clock.now_ms());
                            tracing::debug!(removed, remaining = cache.len(), "Swept weather cache");
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            })
        });

        Self { shutdown_tx, task }
    }

    /// Whether a background task was spawned
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the sweeper and waits for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }
}

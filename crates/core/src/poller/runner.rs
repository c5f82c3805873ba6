//! Poller implementation.
//!
//! One loop task ticks at a fixed interval and spawns a processor cycle per
//! tick. Cycles run as independent tasks; the loop only tracks how many are in
//! flight.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::metrics::POLLER_SKIPPED_TICKS;
use crate::processor::JobProcessor;

use super::config::PollerConfig;
use super::types::PollerStatus;

/// Decrements the in-flight count when a cycle task ends, including by panic.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Timer-driven loop around a [`JobProcessor`].
pub struct Poller {
    config: PollerConfig,
    processor: Arc<JobProcessor>,

    // Runtime state
    running: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    ticks: Arc<AtomicU64>,
    skipped_ticks: Arc<AtomicU64>,
    shutdown_tx: broadcast::Sender<()>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    /// Create a new poller.
    pub fn new(config: PollerConfig, processor: Arc<JobProcessor>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            processor,
            running: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            ticks: Arc::new(AtomicU64::new(0)),
            skipped_ticks: Arc::new(AtomicU64::new(0)),
            shutdown_tx,
            loop_handle: Mutex::new(None),
        }
    }

    /// The processor driven by this poller.
    pub fn processor(&self) -> &Arc<JobProcessor> {
        &self.processor
    }

    /// Start the polling loop (spawns a background task).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Poller already running");
            return;
        }

        info!(
            interval_ms = self.config.interval_ms,
            single_flight = self.config.single_flight,
            "Starting poller"
        );

        let handle = self.spawn_loop();
        *self.loop_handle.lock().await = Some(handle);
    }

    /// Stop the loop and wait for in-flight cycles, up to the shutdown timeout.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Poller not running");
            return;
        }

        info!("Stopping poller");

        // Signal shutdown to the loop
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.loop_handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Poller loop ended abnormally: {}", e);
            }
        }

        let deadline = Instant::now() + Duration::from_secs(self.config.shutdown_timeout_secs);
        while self.in_flight.load(Ordering::SeqCst) > 0 {
            if Instant::now() >= deadline {
                warn!(
                    in_flight = self.in_flight.load(Ordering::SeqCst),
                    "Gave up waiting for in-flight cycles"
                );
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        info!("Poller stopped");
    }

    /// Get current poller status.
    pub fn status(&self) -> PollerStatus {
        PollerStatus {
            running: self.running.load(Ordering::Relaxed),
            interval_ms: self.config.interval_ms,
            ticks: self.ticks.load(Ordering::Relaxed),
            skipped_ticks: self.skipped_ticks.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }

    fn spawn_loop(&self) -> JoinHandle<()> {
        let running = Arc::clone(&self.running);
        let in_flight = Arc::clone(&self.in_flight);
        let ticks = Arc::clone(&self.ticks);
        let skipped_ticks = Arc::clone(&self.skipped_ticks);
        let processor = Arc::clone(&self.processor);
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("Poll loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Poll loop received shutdown signal");
                        break;
                    }
                    _ = interval.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        ticks.fetch_add(1, Ordering::Relaxed);

                        // Only this loop increments, so load-then-add cannot race another tick.
                        if config.single_flight && in_flight.load(Ordering::SeqCst) > 0 {
                            skipped_ticks.fetch_add(1, Ordering::Relaxed);
                            POLLER_SKIPPED_TICKS.inc();
                            debug!("Previous cycle still running, skipping tick");
                            continue;
                        }

                        in_flight.fetch_add(1, Ordering::SeqCst);
                        let guard = InFlightGuard(Arc::clone(&in_flight));
                        let processor = Arc::clone(&processor);
                        tokio::spawn(async move {
                            let _guard = guard;
                            match processor.run_one_cycle().await {
                                Ok(report) if report.is_idle() => {}
                                Ok(report) => debug!(
                                    received = report.received,
                                    completed = report.completed,
                                    failed = report.failed,
                                    "Cycle done"
                                ),
                                Err(e) => warn!("Polling cycle failed: {}", e),
                            }
                        });
                    }
                }
            }
            info!("Poll loop stopped");
        })
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

//! Periodic sweep scheduler for Fake RCON.
//!
//! Fires once per [`SweepConfig::interval`] (one minute by default) for the
//! life of the plugin. Each firing runs a caller-supplied sweep, normally
//! "purge expired authorizations and save if anything changed", and records
//! how many entries it removed.
//!
//! # Integration
//!
//! Most callers use [`spawn`], which runs the loop on its own task and hands
//! back a [`SweepHandle`] to stop it at shutdown:
//!
//! ```ignore
//! let handle = fakercon_sweep::spawn(SweepConfig::default(), move || {
//!     let state = Arc::clone(&state);
//!     async move { state.lock().await.purge_and_save() }
//! });
//! // ... later, at unload:
//! let metrics = handle.stop().await;
//! ```
//!
//! [`SweepScheduler`] can also be driven by hand inside an existing
//! `tokio::select!` loop.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between sweeps. Default: 60 seconds.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

impl SweepConfig {
    /// Default time between sweeps.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

    /// Shortest interval accepted; anything below is raised to this.
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// A config with the given interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Fixes out-of-range values. Called by [`SweepScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                "sweep interval below minimum, clamping to 1s"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Sweep info and metrics
// ---------------------------------------------------------------------------

/// Result of one completed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepInfo {
    /// Sweep number, starting at 1.
    pub sweep: u64,
    /// Entries the sweep removed.
    pub removed: usize,
}

/// Running totals kept by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Sweeps completed.
    pub total_sweeps: u64,
    /// Entries removed across all sweeps.
    pub total_removed: u64,
    /// Sweeps that removed at least one entry.
    pub productive_sweeps: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval sweep timer.
pub struct SweepScheduler {
    interval: Interval,
    sweep_count: u64,
    paused: bool,
    metrics: SweepMetrics,
}

impl SweepScheduler {
    /// Creates a scheduler whose first sweep is due one interval from now.
    ///
    /// Sweeps missed while the host stalled are not replayed: one sweep runs
    /// as soon as possible and the cadence resumes on the original schedule.
    pub fn new(config: SweepConfig) -> Self {
        let config = config.validated();
        let mut interval = time::interval_at(Instant::now() + config.interval, config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(interval_secs = config.interval.as_secs_f64(), "sweep scheduler created");

        Self {
            interval,
            sweep_count: 0,
            paused: false,
            metrics: SweepMetrics::default(),
        }
    }

    /// Waits until the next sweep is due and returns its number.
    ///
    /// While paused this future pends forever; `tokio::select!` keeps
    /// servicing its other branches.
    pub async fn wait_for_sweep(&mut self) -> u64 {
        if self.paused {
            std::future::pending::<()>().await;
        }
        self.interval.tick().await;
        self.sweep_count += 1;
        trace!(sweep = self.sweep_count, "sweep due");
        self.sweep_count
    }

    /// Records how many entries the current sweep removed.
    pub fn record_sweep(&mut self, removed: usize) -> SweepInfo {
        self.metrics.total_sweeps += 1;
        self.metrics.total_removed += removed as u64;
        if removed > 0 {
            self.metrics.productive_sweeps += 1;
            debug!(sweep = self.sweep_count, removed, "sweep removed entries");
        }
        SweepInfo {
            sweep: self.sweep_count,
            removed,
        }
    }

    /// Stops firing until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(sweep = self.sweep_count, "sweep scheduler paused");
        }
    }

    /// Resumes after a pause. The next sweep is due one full interval after
    /// resuming, so time spent paused doesn't cause a burst.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.interval.reset();
            debug!(sweep = self.sweep_count, "sweep scheduler resumed");
        }
    }

    /// Whether the scheduler is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sweeps fired so far.
    pub fn sweep_count(&self) -> u64 {
        self.sweep_count
    }

    /// Snapshot of running totals.
    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }
}

// ---------------------------------------------------------------------------
// Background task
// ---------------------------------------------------------------------------

/// Handle to a sweep loop started with [`spawn`].
///
/// Dropping the handle without calling [`stop`](Self::stop) also ends the
/// loop (its shutdown channel closes), but nobody waits for it.
pub struct SweepHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<SweepMetrics>,
}

impl SweepHandle {
    /// Stops the loop and waits for it to exit.
    ///
    /// A sweep already in progress runs to completion first. Returns the
    /// final metrics.
    pub async fn stop(self) -> SweepMetrics {
        // The loop may already be gone if it panicked; the join below
        // reports that.
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(metrics) => metrics,
            Err(e) => {
                error!(error = %e, "sweep task ended abnormally");
                SweepMetrics::default()
            }
        }
    }
}

/// Spawns a sweep loop on the current Tokio runtime.
///
/// `sweep` is called once per interval and returns how many entries it
/// removed.
///
/// # Panics
/// Panics if called outside a Tokio runtime.
pub fn spawn<F, Fut>(config: SweepConfig, mut sweep: F) -> SweepHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = usize> + Send + 'static,
{
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
    let mut scheduler = SweepScheduler::new(config);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                _ = scheduler.wait_for_sweep() => {
                    let removed = sweep().await;
                    scheduler.record_sweep(removed);
                }
            }
        }
        debug!(sweeps = scheduler.sweep_count(), "sweep loop stopped");
        scheduler.metrics().clone()
    });

    SweepHandle { shutdown, task }
}

//! Integration tests for the sweep scheduler.
//!
//! Uses `start_paused = true` so Tokio's clock auto-advances whenever every
//! task is idle: a test can "wait" an hour in microseconds of real time.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fakercon_sweep::{SweepConfig, SweepMetrics, SweepScheduler, spawn};

// =========================================================================
// SweepConfig
// =========================================================================

#[test]
fn test_default_config_sweeps_every_minute() {
    let cfg = SweepConfig::default();
    assert_eq!(cfg.interval, Duration::from_secs(60));
}

#[test]
fn test_validated_clamps_zero_interval() {
    let cfg = SweepConfig::with_interval(Duration::ZERO).validated();
    assert_eq!(cfg.interval, SweepConfig::MIN_INTERVAL);
}

#[test]
fn test_validated_keeps_sane_interval() {
    let cfg = SweepConfig::with_interval(Duration::from_secs(5)).validated();
    assert_eq!(cfg.interval, Duration::from_secs(5));
}

// =========================================================================
// SweepScheduler driven by hand
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_sweep_fires_after_one_interval() {
    let mut s = SweepScheduler::new(SweepConfig::default());
    let start = tokio::time::Instant::now();

    let n = s.wait_for_sweep().await;

    assert_eq!(n, 1);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_sweeps_increment_monotonically() {
    let mut s = SweepScheduler::new(SweepConfig::default());

    for expected in 1..=4 {
        assert_eq!(s.wait_for_sweep().await, expected);
    }
    assert_eq!(s.sweep_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_record_sweep_updates_metrics() {
    let mut s = SweepScheduler::new(SweepConfig::default());

    s.wait_for_sweep().await;
    let first = s.record_sweep(0);
    s.wait_for_sweep().await;
    let second = s.record_sweep(3);

    assert_eq!(first.sweep, 1);
    assert_eq!(second.sweep, 2);
    assert_eq!(second.removed, 3);
    assert_eq!(
        s.metrics(),
        &SweepMetrics {
            total_sweeps: 2,
            total_removed: 3,
            productive_sweeps: 1,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_paused_scheduler_does_not_fire() {
    let mut s = SweepScheduler::new(SweepConfig::default());
    s.pause();
    s.pause();
    assert!(s.is_paused());

    let fired = tokio::time::timeout(Duration::from_secs(600), s.wait_for_sweep()).await;

    assert!(fired.is_err(), "paused scheduler must not fire");
    assert_eq!(s.sweep_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resume_waits_a_full_interval() {
    let mut s = SweepScheduler::new(SweepConfig::default());
    s.pause();
    tokio::time::advance(Duration::from_secs(300)).await;
    s.resume();
    let resumed_at = tokio::time::Instant::now();

    s.wait_for_sweep().await;

    assert_eq!(resumed_at.elapsed(), Duration::from_secs(60));
}

// =========================================================================
// Background loop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_spawned_loop_runs_sweep_each_interval() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handle = spawn(SweepConfig::default(), move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            1
        }
    });

    tokio::time::sleep(Duration::from_secs(181)).await;
    let metrics = handle.stop().await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(metrics.total_sweeps, 3);
    assert_eq!(metrics.total_removed, 3);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_first_sweep_runs_nothing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handle = spawn(SweepConfig::default(), move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        }
    });

    tokio::time::sleep(Duration::from_secs(10)).await;
    let metrics = handle.stop().await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(metrics, SweepMetrics::default());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_handle_ends_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handle = spawn(SweepConfig::default(), move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        }
    });

    drop(handle);
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

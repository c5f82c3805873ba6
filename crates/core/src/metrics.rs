//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Processor (cycles, job outcomes, failure stages, acknowledgements)
//! - Converter (conversion duration)
//! - Notifications (deliveries per channel)
//! - Poller (ticks skipped by the single-flight guard)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Processor Metrics
// =============================================================================

/// Polling cycles by result.
pub static CYCLES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaconv_cycles_total", "Total polling cycles"),
        &["result"], // "idle", "processed", "receive_error"
    )
    .unwrap()
});

/// Jobs finished by outcome.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaconv_jobs_total", "Total jobs processed"),
        &["outcome"], // "completed", "failed"
    )
    .unwrap()
});

/// Job failures by pipeline stage.
pub static JOB_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaconv_job_failures_total", "Job failures by stage"),
        &["stage"], // "parse", "fetch", "stage", "transform", "store", "timeout"
    )
    .unwrap()
});

/// End-to-end job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediaconv_job_duration_seconds",
            "Duration of one job from parse to acknowledge",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Acknowledgement decisions.
pub static ACKNOWLEDGEMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediaconv_acknowledgements_total",
            "Queue acknowledgement decisions",
        ),
        &["result"], // "acknowledged", "failed", "retained"
    )
    .unwrap()
});

// =============================================================================
// Converter Metrics
// =============================================================================

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediaconv_conversion_duration_seconds",
            "Duration of the transform step",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["format"],
    )
    .unwrap()
});

// =============================================================================
// Notification Metrics
// =============================================================================

/// Status event deliveries by channel and result.
pub static NOTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediaconv_notifications_total",
            "Status event deliveries",
        ),
        &["channel", "result"], // result: "delivered", "failed"
    )
    .unwrap()
});

// =============================================================================
// Poller Metrics
// =============================================================================

/// Ticks skipped because a cycle was still running.
pub static POLLER_SKIPPED_TICKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mediaconv_poller_skipped_ticks_total",
        "Poller ticks skipped while a cycle was in flight",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Processor
        Box::new(CYCLES_TOTAL.clone()),
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_FAILURES_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(ACKNOWLEDGEMENTS_TOTAL.clone()),
        // Converter
        Box::new(CONVERSION_DURATION.clone()),
        // Notifications
        Box::new(NOTIFICATIONS_TOTAL.clone()),
        // Poller
        Box::new(POLLER_SKIPPED_TICKS.clone()),
    ]
}

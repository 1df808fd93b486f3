//! Reconciliation pass metrics
//!
//! ## Design
//! - **SeqCst ordering** for the atomics feeding the average pass time
//! - **Relaxed ordering** for independent counters
//! - **Microsecond storage**; reporting helpers convert to ms

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::observability::{MetricsError, MetricsResult};

/// Counters describing scheduled reconciliation passes.
#[derive(Debug, Default)]
pub struct PassMetrics {
    passes_started: AtomicU64,
    passes_succeeded: AtomicU64,
    passes_failed: AtomicU64,
    passes_timed_out: AtomicU64,
    ticks_skipped: AtomicU64,
    events_created: AtomicU64,
    events_deleted: AtomicU64,
    timed_passes: AtomicU64,
    total_pass_time_micros: AtomicU64,
    last_pass_time_micros: AtomicU64,
}

/// Point-in-time copy of [`PassMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassMetricsSnapshot {
    pub passes_started: u64,
    pub passes_succeeded: u64,
    pub passes_failed: u64,
    pub passes_timed_out: u64,
    pub ticks_skipped: u64,
    pub events_created: u64,
    pub events_deleted: u64,
}

impl PassMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass_started(&self) -> MetricsResult<()> {
        self.passes_started.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Record a pass that converged, with the mutations it issued.
    pub fn record_pass_succeeded(
        &self,
        created: usize,
        deleted: usize,
        elapsed: Duration,
    ) -> MetricsResult<()> {
        self.passes_succeeded.fetch_add(1, Ordering::Relaxed);
        self.events_created.fetch_add(created as u64, Ordering::Relaxed);
        self.events_deleted.fetch_add(deleted as u64, Ordering::Relaxed);
        self.record_pass_time(elapsed)
    }

    pub fn record_pass_failed(&self, elapsed: Duration) -> MetricsResult<()> {
        self.passes_failed.fetch_add(1, Ordering::Relaxed);
        self.record_pass_time(elapsed)
    }

    pub fn record_pass_timeout(&self) -> MetricsResult<()> {
        self.passes_timed_out.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// A tick fired while the previous pass still held the gate.
    pub fn record_tick_skipped(&self) -> MetricsResult<()> {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn record_pass_time(&self, elapsed: Duration) -> MetricsResult<()> {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

        // SeqCst for consistency with avg_pass_time_ms
        self.total_pass_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.timed_passes.fetch_add(1, Ordering::SeqCst);

        self.last_pass_time_micros.store(micros, Ordering::Relaxed);
        Ok(())
    }

    /// Average duration of finished passes in milliseconds.
    pub fn avg_pass_time_ms(&self) -> MetricsResult<f64> {
        let total = self.total_pass_time_micros.load(Ordering::SeqCst);
        let count = self.timed_passes.load(Ordering::SeqCst);

        if count == 0 {
            return Err(MetricsError::EmptyData { metric: "average pass time" });
        }

        Ok((total as f64 / count as f64) / 1_000.0)
    }

    pub fn last_pass_time_ms(&self) -> u64 {
        self.last_pass_time_micros.load(Ordering::Relaxed) / 1_000
    }

    pub fn snapshot(&self) -> PassMetricsSnapshot {
        PassMetricsSnapshot {
            passes_started: self.passes_started.load(Ordering::Relaxed),
            passes_succeeded: self.passes_succeeded.load(Ordering::Relaxed),
            passes_failed: self.passes_failed.load(Ordering::Relaxed),
            passes_timed_out: self.passes_timed_out.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            events_created: self.events_created.load(Ordering::Relaxed),
            events_deleted: self.events_deleted.load(Ordering::Relaxed),
        }
    }
}

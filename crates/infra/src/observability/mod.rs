//! Observability infrastructure for reconciliation passes
//!
//! Counters are plain atomics. Every record method returns
//! `MetricsResult<()>` so callers handle metric failures uniformly (log and
//! continue); recording currently always succeeds.

pub mod metrics;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "average pass time")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

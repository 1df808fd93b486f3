//! Metrics collection modules

pub mod pass;

pub use pass::{PassMetrics, PassMetricsSnapshot};

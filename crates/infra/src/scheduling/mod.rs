//! Scheduling infrastructure for periodic reconciliation
//!
//! The scheduler follows the same runtime rules throughout:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations
//! - At most one pass in flight; overlapping ticks are skipped

pub mod error;
pub mod reconcile_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use reconcile_scheduler::{ReconcileJob, ReconcileScheduler, ReconcileSchedulerConfig};

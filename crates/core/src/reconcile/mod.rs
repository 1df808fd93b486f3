//! Slot reconciliation
//!
//! [`plan`] computes the diff between desired and observed slots without any
//! I/O; [`Reconciler`] fetches both sides over one window and applies it.

pub mod plan;
pub mod service;

pub use plan::{plan, ReconcilePlan};
pub use service::{PassReport, Reconciler, ReconcilerSettings};

//! # busysync Core
//!
//! Slot reconciliation engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the calendar backend and the busy-slot provider
//! - The reconciler (diff desired vs observed slots, apply creates/deletes)
//! - The duplicate collapser (startup and maintenance cleanup)
//!
//! ## Architecture Principles
//! - Only depends on `busysync-domain`
//! - No HTTP, scheduling or platform code
//! - All external dependencies via traits
//! - Stateless across passes; all state lives in the backend and the portal

pub mod busy_slot_ports;
pub mod calendar_ports;
pub mod collapse;
pub mod reconcile;

pub use busy_slot_ports::BusySlotSource;
pub use calendar_ports::CalendarMirror;
pub use collapse::{group_by_slot, CollapseReport, CollapseSummary, DuplicateCollapser};
pub use reconcile::{plan, PassReport, ReconcilePlan, Reconciler, ReconcilerSettings};

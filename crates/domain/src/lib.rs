//! # busysync Domain
//!
//! Domain types shared by every busysync crate.
//!
//! This crate contains:
//! - Slot, slot set and managed event types
//! - The reconciliation window and the weekly availability schedule
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other busysync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod schedule;
pub mod slot;
pub mod window;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use schedule::{DaySchedule, WeeklySchedule};
pub use slot::{EventId, ManagedEvent, Slot, SlotDuration, SlotSet};
pub use window::ReconciliationWindow;

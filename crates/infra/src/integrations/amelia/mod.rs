//! WordPress Amelia booking plugin adapter
//!
//! Amelia's public slots endpoint reports occupied slots per day, so the
//! desired state is read directly from `data.occupied`.

mod client;
mod types;

pub use client::AmeliaBusySlotSource;

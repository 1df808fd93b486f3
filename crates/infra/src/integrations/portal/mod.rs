//! Hospital appointments portal adapter
//!
//! The portal only publishes *free* intervals. Busy slots are the slots of
//! the configured weekly schedule that the portal does not list as free.

mod client;
mod types;

pub use client::PortalBusySlotSource;

//! # busysync
//!
//! Daemon that mirrors a booking portal's busy slots into a calendar.
//!
//! This crate wires the adapters from `busysync-infra` into the services of
//! `busysync-core` and exposes the command-line entry points.

pub mod cli;
pub mod context;
pub mod lifecycle;
pub mod logging;

pub use context::AppContext;

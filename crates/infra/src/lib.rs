//! # busysync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Configuration loading (TOML/JSON files plus environment overrides)
//! - HTTP client with bounded retries
//! - External service integrations (Google Calendar, Amelia, free-slot portal)
//! - Cron scheduler, pass metrics and the single-instance lock
//!
//! ## Architecture
//! - Implements traits defined in `busysync-core`
//! - Depends on `busysync-domain` and `busysync-core`
//! - Contains all "impure" code (network, filesystem, timers)

pub mod config;
pub mod errors;
pub mod http;
pub mod instance_lock;
pub mod integrations;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::*;
pub use instance_lock::*;
pub use integrations::*;

//! Application constants
//!
//! Centralized location for the domain-level defaults used throughout the
//! application.

// Reconciliation defaults
pub const DEFAULT_RECONCILE_DAYS: u32 = 7;
pub const DEFAULT_EVENT_DURATION_MINUTES: u32 = 30;
pub const DEFAULT_TIMEZONE: &str = "UTC";

// Duplicate collapse defaults
pub const DEFAULT_COLLAPSE_DAYS: u32 = 31;
pub const DEFAULT_MAX_COLLAPSE_PASSES: u32 = 10;

// Managed event marker written into summary and description
pub const DEFAULT_OWNERSHIP_MARKER: &str = "med busy";

// Scheduler defaults (six-field cron: sec min hour dom mon dow)
pub const DEFAULT_CRON_EXPRESSION: &str = "0 * * * * *";
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 300;

// Calendar backend
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const GOOGLE_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

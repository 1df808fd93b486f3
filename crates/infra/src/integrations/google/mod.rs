//! Google Calendar v3 adapter
//!
//! Implements [`busysync_core::CalendarMirror`] over the Events REST API.
//! Managed events are recognised by an ownership marker written into both
//! summary and description; every other event on the calendar is ignored.

pub mod auth;
pub mod mirror;
mod types;

pub use auth::{
    access_token_provider, AccessTokenProvider, RefreshingAccessToken, StaticAccessToken,
};
pub use mirror::GoogleCalendarMirror;

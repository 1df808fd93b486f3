//! HTTP client shared by the calendar and busy-slot adapters

pub mod client;

pub use client::{ensure_success, HttpClient, HttpClientBuilder};

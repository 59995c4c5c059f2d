//! HTTP client module
//!
//! Provides the authenticated API client with token refresh, request
//! queuing, global cancellation, and parameter sanitation.
//!
//! # Features
//!
//! - **Bearer injection**: tokens from the store, never overwriting an
//!   explicit `Authorization` header
//! - **Single-flight refresh**: one refresh call no matter how many
//!   requests expire at once, queued requests drained FIFO
//! - **Global cancellation**: `cancel_all` fails everything in flight and
//!   leaves later requests untouched
//! - **Error reporting**: failures published on the event bus for the UI

mod cancel;
mod client;
mod params;
mod refresh;

pub use client::{ApiClient, ClientConfig, ClientConfigBuilder, RequestConfig};
pub use params::remove_empty_params;

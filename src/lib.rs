// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

//! # FabWire Client
//!
//! Authenticated REST client for the FabWire shop-floor platform
//! (jobs, piecemarks, barcodes, shipping).
//!
//! ## Features
//!
//! - **Bearer-token injection**: ID token from the store on every request,
//!   session/logout token fallback for the logout call
//! - **Single-flight token refresh**: one refresh call no matter how many
//!   requests hit an expired session, with FIFO request queuing
//! - **Global cancellation**: `cancel_all` abandons every in-flight call
//!   atomically, leaving later requests untouched
//! - **Centralized error reporting**: failures published as structured
//!   events for the embedding UI; unrecoverable auth failures force logout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fabwire_client::{ApiClient, ClientConfig, EventBus, MemoryTokenStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> fabwire_client::Result<()> {
//!     let config = ClientConfig::builder()
//!         .base_url("https://api.fabwire.example")
//!         .build()?;
//!
//!     let tokens = Arc::new(MemoryTokenStore::new());
//!     let events = EventBus::new();
//!     let client = ApiClient::new(config, tokens, events.clone())?;
//!
//!     let jobs: serde_json::Value = client.get("/jobs").await?;
//!     println!("{jobs}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         ApiClient                           │
//! │  get/post/put/delete → inject → send → classify → refresh  │
//! └─────────────────────────────────────────────────────────────┘
//!                │                  │                  │
//!        ┌───────┴──────┐   ┌───────┴───────┐   ┌──────┴──────┐
//!        │  TokenStore  │   │   EventBus    │   │ CancelScope │
//!        ├──────────────┤   ├───────────────┤   ├─────────────┤
//!        │ ID token     │   │ error events  │   │ cancel_all  │
//!        │ refresh token│   │ logout event  │   │ fresh group │
//!        │ access token │   │               │   │             │
//!        └──────────────┘   └───────────────┘   └─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Token storage
pub mod token;

/// Event bus
pub mod events;

/// Authenticated HTTP client
pub mod http;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use events::EventBus;
pub use http::{remove_empty_params, ApiClient, ClientConfig, ClientConfigBuilder, RequestConfig};
pub use token::{MemoryTokenStore, TokenStore};
pub use types::{ApiErrorBody, ErrorEvent, TokenSet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Error types for the FabWire client
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// Fallback message used when the server did not supply one.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Server signature for a stale embedded access token, matched on the
/// response's Message/Detail fields. The wire protocol carries no structured
/// code for this condition, so the literal text is the only handle we have.
const ACCESS_TOKEN_SIGNATURE: &str = "access token could not be verified";

/// The main error type for the FabWire client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request cancelled")]
    Cancelled,

    // ============================================================================
    // Application Errors
    // ============================================================================
    /// A non-2xx response carrying the platform's error envelope.
    ///
    /// `code` is the application-level code from the body (`Code`), which is
    /// distinct from the HTTP `status`; callers match `code == Some(401)` via
    /// [`Error::is_unauthorized`].
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
        detail: Option<String>,
    },

    // ============================================================================
    // Session Errors
    // ============================================================================
    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    #[error("Token refresh timed out after {timeout_ms}ms")]
    RefreshTimeout { timeout_ms: u64 },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an API error from the response envelope fields
    pub fn api(status: u16, code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Create a token refresh error
    pub fn token_refresh(message: impl Into<String>) -> Self {
        Self::TokenRefresh {
            message: message.into(),
        }
    }

    /// True for an application-level 401 (expired or missing session)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Api { code: Some(401), .. })
    }

    /// True when the server rejected a stale embedded access token on a
    /// request re-issued after a refresh. Matched on the literal message
    /// text; see the module-level constant.
    pub fn is_signature_error(&self) -> bool {
        match self {
            Error::Api {
                message, detail, ..
            } => {
                message.to_lowercase().contains(ACCESS_TOKEN_SIGNATURE)
                    || detail
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(ACCESS_TOKEN_SIGNATURE))
            }
            _ => false,
        }
    }

    /// The HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for the FabWire client
pub type Result<T> = std::result::Result<T, Error>;

//! Common types used throughout the FabWire client
//!
//! This module contains shared type definitions, type aliases,
//! and the wire shapes of the platform's auth and error envelopes.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Session Tokens
// ============================================================================

/// The three tokens issued together by the platform.
///
/// This is also the refresh endpoint's success body, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    /// Bearer credential attached to ordinary authorized requests
    pub id_token: String,
    /// Long-lived token exchanged at the refresh endpoint
    pub refresh_token: String,
    /// Narrower-purpose token embedded in certain request bodies
    pub access_token: String,
}

impl TokenSet {
    /// Create a new token set
    pub fn new(
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            access_token: access_token.into(),
        }
    }
}

// ============================================================================
// Error Envelope
// ============================================================================

/// The application-level error envelope carried by failed responses.
///
/// Every field is optional on the wire; classification falls back to the
/// HTTP status and a generic message when the body is absent or malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable summary
    #[serde(rename = "Message", default)]
    pub message: Option<String>,

    /// Longer explanation, when the server provides one
    #[serde(rename = "Detail", default)]
    pub detail: Option<String>,

    /// Application error code; 401 marks an expired or missing session
    #[serde(rename = "Code", default)]
    pub code: Option<i64>,
}

// ============================================================================
// Events
// ============================================================================

/// Structured error event published on the event bus for UI consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// HTTP status of the failing response
    pub status: u16,
    /// Server-supplied message, or a generic fallback
    pub message: String,
}

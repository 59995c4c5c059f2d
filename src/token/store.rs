//! Token store trait and in-memory implementation
//!
//! The session (ID, refresh, access, and session/logout tokens) is owned
//! exclusively by a [`TokenStore`]; the client only reads and writes tokens
//! through this interface and never persists them itself.

use crate::types::TokenSet;
use std::sync::RwLock;

/// Storage seam for session tokens.
///
/// Implementations must be cheap and non-blocking: the client calls these
/// methods synchronously on the request path.
pub trait TokenStore: Send + Sync {
    /// Whether a normal session token is currently stored
    fn has_token(&self) -> bool;

    /// The ID token used as bearer credential on authorized requests
    fn token(&self) -> Option<String>;

    /// The session/logout token, usable only for the logout call
    fn session_token(&self) -> Option<String>;

    /// The long-lived refresh token
    fn refresh_token(&self) -> Option<String>;

    /// The access token embedded in certain request bodies
    fn access_token(&self) -> Option<String>;

    /// Store the ID token
    fn set_token(&self, value: String);

    /// Store the session/logout token
    fn set_session_token(&self, value: String);

    /// Store the refresh token
    fn set_refresh_token(&self, value: String);

    /// Store the access token
    fn set_access_token(&self, value: String);

    /// Destroy the session (all tokens)
    fn clear(&self);

    /// Remove only the session/logout token
    fn clear_session_token(&self);

    /// Store all three tokens returned by a successful refresh
    fn store_token_set(&self, tokens: &TokenSet) {
        self.set_token(tokens.id_token.clone());
        self.set_refresh_token(tokens.refresh_token.clone());
        self.set_access_token(tokens.access_token.clone());
    }
}

#[derive(Debug, Default)]
struct StoreState {
    token: Option<String>,
    session_token: Option<String>,
    refresh_token: Option<String>,
    access_token: Option<String>,
}

/// In-memory [`TokenStore`] backed by an `RwLock`.
///
/// The default store for tests and for embedders that keep the session in
/// process memory; applications with durable session storage supply their
/// own implementation.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    state: RwLock<StoreState>,
}

impl MemoryTokenStore {
    /// Create an empty store (no session)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with a full token set
    pub fn with_tokens(tokens: TokenSet) -> Self {
        let store = Self::new();
        store.store_token_set(&tokens);
        store
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().expect("token store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().expect("token store lock poisoned")
    }
}

impl TokenStore for MemoryTokenStore {
    fn has_token(&self) -> bool {
        self.read().token.is_some()
    }

    fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    fn session_token(&self) -> Option<String> {
        self.read().session_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    fn set_token(&self, value: String) {
        self.write().token = Some(value);
    }

    fn set_session_token(&self, value: String) {
        self.write().session_token = Some(value);
    }

    fn set_refresh_token(&self, value: String) {
        self.write().refresh_token = Some(value);
    }

    fn set_access_token(&self, value: String) {
        self.write().access_token = Some(value);
    }

    fn clear(&self) {
        let mut state = self.write();
        *state = StoreState::default();
    }

    fn clear_session_token(&self) {
        self.write().session_token = None;
    }
}

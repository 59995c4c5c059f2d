//! Authenticated HTTP client for the FabWire API
//!
//! Wraps `reqwest` with the concerns every screen in the product shares:
//! - Bearer-token injection from the token store
//! - Global request cancellation
//! - Single-flight token refresh with FIFO request queuing
//! - Centralized error classification and event reporting
//!
//! Dispatch applies a fixed pipeline per request: token injection, send,
//! error classification, then (for an expired session) refresh and a single
//! re-issue. Re-issued requests never re-enter the refresh path, so a
//! refresh that hands back an already-expired token surfaces the failure
//! instead of recursing.

use super::cancel::CancelScope;
use super::refresh::{Entry, RefreshGate};
use crate::error::{Error, Result, GENERIC_ERROR_MESSAGE};
use crate::events::EventBus;
use crate::token::TokenStore;
use crate::types::{ApiErrorBody, ErrorEvent, JsonValue, TokenSet};
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// JSON body field carrying the embedded access token
const ACCESS_TOKEN_FIELD: &str = "accessToken";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all endpoint paths resolve against
    pub base_url: Url,
    /// Request timeout
    pub timeout: Duration,
    /// Upper bound on the refresh call; a hung refresh endpoint fails the
    /// whole queued cycle instead of stalling it forever
    pub refresh_timeout: Duration,
    /// Locale sent as `Accept-Language` on every request
    pub locale: String,
    /// Path of the token refresh endpoint
    pub refresh_path: String,
    /// Path of the logout endpoint
    pub logout_path: String,
    /// Paths whose failures are not reported on the event bus
    pub ignored_error_paths: Vec<String>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for the client config
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    refresh_timeout: Option<Duration>,
    locale: Option<String>,
    refresh_path: Option<String>,
    logout_path: Option<String>,
    ignored_error_paths: Vec<String>,
    default_headers: HashMap<String, String>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Set the base URL (required)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the refresh call timeout
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = Some(timeout);
        self
    }

    /// Set the `Accept-Language` locale
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the refresh endpoint path
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Set the logout endpoint path
    pub fn logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = Some(path.into());
        self
    }

    /// Exclude a path from error-event reporting
    pub fn ignore_error_path(mut self, path: impl Into<String>) -> Self {
        self.ignored_error_paths.push(path.into());
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the config
    pub fn build(self) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::config("base_url is required"))?;
        Ok(ClientConfig {
            base_url: Url::parse(&base_url)?,
            timeout: self.timeout.unwrap_or(Duration::from_secs(30)),
            refresh_timeout: self.refresh_timeout.unwrap_or(Duration::from_secs(10)),
            locale: self.locale.unwrap_or_else(|| "en-US".to_string()),
            refresh_path: self
                .refresh_path
                .unwrap_or_else(|| "/auth/refresh".to_string()),
            logout_path: self
                .logout_path
                .unwrap_or_else(|| "/auth/logout".to_string()),
            ignored_error_paths: self.ignored_error_paths,
            default_headers: self.default_headers,
            user_agent: self.user_agent.unwrap_or_else(|| {
                format!("fabwire-client/{}", env!("CARGO_PKG_VERSION"))
            }),
        })
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn has_authorization_header(&self) -> bool {
        self.headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case("authorization"))
    }
}

/// Authenticated API client
///
/// An explicit instance owning its cancellation scope and refresh gate;
/// the token store and event bus are injected so tests and embedders can
/// construct isolated clients.
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    events: EventBus,
    cancel: CancelScope,
    refresh: Arc<RefreshGate>,
}

impl ApiClient {
    /// Create a new client
    pub fn new(
        config: ClientConfig,
        tokens: Arc<dyn TokenStore>,
        events: EventBus,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            tokens,
            events,
            cancel: CancelScope::new(),
            refresh: RefreshGate::new(),
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the event bus this client reports on
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ============================================================================
    // Public request surface
    // ============================================================================

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with(path, RequestConfig::default()).await
    }

    /// Make a GET request with config
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let payload = self.dispatch(Method::GET, path, config).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: JsonValue) -> Result<T> {
        self.post_with(path, RequestConfig::new().json(body)).await
    }

    /// Make a POST request with config
    pub async fn post_with<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let payload = self.dispatch(Method::POST, path, config).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: JsonValue) -> Result<T> {
        self.put_with(path, RequestConfig::new().json(body)).await
    }

    /// Make a PUT request with config
    pub async fn put_with<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let payload = self.dispatch(Method::PUT, path, config).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.delete_with(path, RequestConfig::default()).await
    }

    /// Make a DELETE request with config
    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let payload = self.dispatch(Method::DELETE, path, config).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Make a generic request, returning the decoded payload
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<JsonValue> {
        self.dispatch(method, path, config).await
    }

    /// Call the logout endpoint.
    ///
    /// Token injection picks the bearer: the normal session token, or the
    /// session/logout token when no normal session exists. The response
    /// body is ignored.
    pub async fn logout(&self) -> Result<()> {
        let path = self.config.logout_path.clone();
        self.dispatch(Method::POST, &path, RequestConfig::default())
            .await?;
        Ok(())
    }

    /// Cancel every in-flight request.
    ///
    /// Requests issued after this call are unaffected, even on the same tick.
    pub fn cancel_all(&self) {
        debug!("cancelling all in-flight requests");
        self.cancel.cancel_all();
    }

    // ============================================================================
    // Dispatch pipeline
    // ============================================================================

    /// Run one request through the pipeline under the live cancellation token
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<JsonValue> {
        let cancelled = self.cancel.handle();
        tokio::select! {
            biased;
            () = cancelled.cancelled() => Err(Error::Cancelled),
            result = self.run_pipeline(method, path, config) => result,
        }
    }

    async fn run_pipeline(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<JsonValue> {
        // Injection happens synchronously before dispatch
        let bearer = self.resolve_bearer(path, &config);

        match self
            .send_once(method.clone(), path, &config, bearer.as_deref())
            .await
        {
            Ok(payload) => Ok(payload),
            Err(err) => self.handle_failure(method, path, config, err).await,
        }
    }

    /// Pick the bearer credential for this request, if any.
    ///
    /// An explicitly supplied `Authorization` header is never overwritten.
    /// The logout path falls back to the session/logout token when no normal
    /// session token exists.
    fn resolve_bearer(&self, path: &str, config: &RequestConfig) -> Option<String> {
        if config.has_authorization_header() {
            return None;
        }
        if path == self.config.logout_path && !self.tokens.has_token() {
            return self.tokens.session_token();
        }
        self.tokens.token()
    }

    /// Build and send a single request, classifying the response.
    ///
    /// Success returns the decoded JSON payload (`null` for an empty body);
    /// failure returns `Error::Api` carrying the platform's error envelope.
    async fn send_once(
        &self,
        method: Method,
        path: &str,
        config: &RequestConfig,
        bearer: Option<&str>,
    ) -> Result<JsonValue> {
        let url = self.build_url(path)?;

        let mut req = self.client.request(method, url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        req = req.header(ACCEPT_LANGUAGE, &self.config.locale);
        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(body) = &config.body {
            req = req.json(body);
        }
        if let Some(timeout) = config.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(JsonValue::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }

        let envelope: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            code: envelope.code,
            message: envelope
                .message
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            detail: envelope.detail,
        })
    }

    /// Classify a failure: session expiry enters the refresh machine, all
    /// other errors are reported and returned unchanged.
    async fn handle_failure(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
        err: Error,
    ) -> Result<JsonValue> {
        if err.is_unauthorized() && self.tokens.has_token() {
            return self.refresh_and_reissue(method, path, config).await;
        }
        self.report(path, &err);
        Err(err)
    }

    /// The IDLE/REFRESHING state machine entry point for an expired session
    async fn refresh_and_reissue(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<JsonValue> {
        match self.refresh.begin() {
            Entry::Waiter(outcome) => {
                debug!(%method, path, "refresh in flight, queueing request");
                match outcome.await {
                    Ok(Ok(token)) => self.reissue(method, path, config, &token).await,
                    Ok(Err(message)) => {
                        let err = Error::token_refresh(message);
                        self.report(path, &err);
                        Err(err)
                    }
                    Err(_) => {
                        let err = Error::token_refresh("token refresh aborted");
                        self.report(path, &err);
                        Err(err)
                    }
                }
            }
            Entry::Leader(lease) => {
                warn!(path, "session expired, refreshing tokens");
                match self.call_refresh_endpoint().await {
                    Ok(tokens) => {
                        self.tokens.store_token_set(&tokens);
                        let id_token = tokens.id_token;
                        lease.complete(Ok(id_token.clone()));
                        self.reissue(method, path, config, &id_token).await
                    }
                    Err(err) => {
                        lease.complete(Err(err.to_string()));
                        self.report(path, &err);
                        warn!("token refresh failed, forcing logout");
                        self.events.emit_logout();
                        Err(err)
                    }
                }
            }
        }
    }

    /// Re-issue a request with the refreshed bearer.
    ///
    /// Runs at most twice: once as-is, and once more only when the server
    /// rejects the body's embedded access token with its signature error, in
    /// which case the field is patched from the store. Failures here never
    /// trigger another refresh.
    async fn reissue(
        &self,
        method: Method,
        path: &str,
        mut config: RequestConfig,
        token: &str,
    ) -> Result<JsonValue> {
        match self
            .send_once(method.clone(), path, &config, Some(token))
            .await
        {
            Ok(payload) => Ok(payload),
            Err(err) if err.is_signature_error() => {
                let patched = self.patch_access_token(&mut config);
                if patched {
                    debug!(path, "retrying with repaired access token");
                    match self.send_once(method, path, &config, Some(token)).await {
                        Ok(payload) => Ok(payload),
                        Err(second) => {
                            self.report(path, &second);
                            Err(second)
                        }
                    }
                } else {
                    self.report(path, &err);
                    Err(err)
                }
            }
            Err(err) => {
                self.report(path, &err);
                Err(err)
            }
        }
    }

    /// Overwrite the body's embedded access token with the freshly stored one
    fn patch_access_token(&self, config: &mut RequestConfig) -> bool {
        let Some(JsonValue::Object(body)) = config.body.as_mut() else {
            return false;
        };
        let Some(access_token) = self.tokens.access_token() else {
            return false;
        };
        body.insert(
            ACCESS_TOKEN_FIELD.to_string(),
            JsonValue::String(access_token),
        );
        true
    }

    /// Exchange the refresh token for a new token set, under a bounded timeout
    async fn call_refresh_endpoint(&self) -> Result<TokenSet> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .ok_or_else(|| Error::token_refresh("no refresh token stored"))?;
        let url = self.build_url(&self.config.refresh_path)?;
        let timeout = self.config.refresh_timeout;

        let exchange = async {
            let response = self
                .client
                .get(url)
                .header(ACCEPT_LANGUAGE, &self.config.locale)
                .bearer_auth(refresh_token)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let envelope: ApiErrorBody = response.json().await.unwrap_or_default();
                return Err(Error::token_refresh(envelope.message.unwrap_or_else(
                    || format!("refresh endpoint returned {}", status.as_u16()),
                )));
            }
            Ok(response.json::<TokenSet>().await?)
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(Error::RefreshTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Report a failure on the event bus, unless the path is ignore-listed
    /// or nobody is listening. Always leaves the error to the caller.
    fn report(&self, path: &str, err: &Error) {
        if self.config.ignored_error_paths.iter().any(|p| p == path) {
            return;
        }
        if !self.events.has_error_listeners() {
            return;
        }
        // Errors without a response (transport failures, aborted refreshes)
        // carry status 0
        let (status, message) = match err {
            Error::Api {
                status, message, ..
            } => (*status, message.clone()),
            other => (0, other.to_string()),
        };
        self.events.emit_error(ErrorEvent { status, message });
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("has_token", &self.tokens.has_token())
            .finish_non_exhaustive()
    }
}

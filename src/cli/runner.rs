//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::http::{remove_empty_params, ApiClient, ClientConfig, RequestConfig};
use crate::token::{MemoryTokenStore, TokenStore};
use crate::types::JsonValue;
use reqwest::Method;
use std::sync::Arc;

/// Executes parsed CLI commands against a configured client
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command and print the decoded payload
    pub async fn run(self) -> Result<()> {
        let base_url = self
            .cli
            .base_url
            .clone()
            .ok_or_else(|| Error::config("--base-url or FABWIRE_BASE_URL is required"))?;

        let tokens = Arc::new(MemoryTokenStore::new());
        if let Some(token) = &self.cli.token {
            tokens.set_token(token.clone());
        }
        if let Some(refresh) = &self.cli.refresh_token {
            tokens.set_refresh_token(refresh.clone());
        }
        if let Some(access) = &self.cli.access_token {
            tokens.set_access_token(access.clone());
        }
        if let Some(session) = &self.cli.session_token {
            tokens.set_session_token(session.clone());
        }

        let events = EventBus::new();
        let mut logout_events = events.subscribe_logout();

        let config = ClientConfig::builder()
            .base_url(base_url)
            .locale(self.cli.locale.clone())
            .build()?;
        let client = ApiClient::new(config, tokens, events)?;

        let result = self.execute(&client).await;

        // A forced logout means the session is gone regardless of the outcome
        if logout_events.try_recv().is_ok() {
            eprintln!("Session could not be refreshed; logged out.");
        }

        match result? {
            JsonValue::Null => println!("OK"),
            payload => println!("{}", serde_json::to_string_pretty(&payload)?),
        }
        Ok(())
    }

    async fn execute(&self, client: &ApiClient) -> Result<JsonValue> {
        match &self.cli.command {
            Commands::Get { path, query } => {
                let mut request = RequestConfig::new();
                for pair in query {
                    let (key, value) = pair.split_once('=').ok_or_else(|| {
                        Error::config(format!("invalid query parameter '{pair}', expected key=value"))
                    })?;
                    request = request.query(key, value);
                }
                client.request(Method::GET, path, request).await
            }
            Commands::Post { path, data } => {
                client
                    .request(Method::POST, path, body_config(data.as_deref())?)
                    .await
            }
            Commands::Put { path, data } => {
                client
                    .request(Method::PUT, path, body_config(data.as_deref())?)
                    .await
            }
            Commands::Delete { path } => {
                client.request(Method::DELETE, path, RequestConfig::new()).await
            }
            Commands::Logout => {
                client.logout().await?;
                Ok(JsonValue::Null)
            }
        }
    }
}

/// Parse an inline JSON body, stripping empty filter fields
fn body_config(data: Option<&str>) -> Result<RequestConfig> {
    match data {
        Some(raw) => {
            let body: JsonValue = serde_json::from_str(raw)?;
            Ok(RequestConfig::new().json(remove_empty_params(body)))
        }
        None => Ok(RequestConfig::new()),
    }
}

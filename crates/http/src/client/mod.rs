//! Portal HTTP client

mod auth;
pub mod config;
pub mod error;

pub use auth::LoginOutcome;

use crate::events::{AuthEvent, AuthEvents};
use config::ClientConfig;
use error::ClientError;
use portal_core::SessionStore;
use reqwest::{Client, ClientBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Timeout applied when the builder is not given one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_USER_AGENT: &str = concat!("portal-client/", env!("CARGO_PKG_VERSION"));

/// Portal API client
///
/// Clones share the HTTP connection pool, the session store and the event bus.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    events: AuthEvents,
}

impl PortalClient {
    /// Create a client with default configuration around an existing session store
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(base_url)
            .session_store(session)
            .build()
    }

    /// Create a new client builder
    pub fn builder() -> PortalClientBuilder {
        PortalClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.session
    }

    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Create a request builder, attaching the stored token if there is one
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = self.session.access_token() {
            request = request.header(header::AUTHORIZATION, token.bearer());
        }

        request
    }

    /// Execute a request and decode a JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(ClientError::from_transport)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Execute a request whose body is ignored
    pub async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        self.send(request).await.map(|_| ())
    }

    /// Send and turn non-success statuses into errors. Every `401`, whatever
    /// the endpoint, drops the local session first.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(ClientError::from_transport)?;
        let status = response.status();
        debug!(url = %response.url(), %status, "received response");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(status, &body))
    }

    fn expire_session(&self) {
        if let Err(e) = self.session.clear_session() {
            error!(error = %e, "failed to clear session after 401");
        }
        warn!("request was unauthorized, session cleared");
        self.events.publish(AuthEvent::SessionExpired);
    }
}

/// Builder for PortalClient
#[derive(Default)]
pub struct PortalClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    session: Option<SessionStore>,
    events: Option<AuthEvents>,
}

impl PortalClientBuilder {
    /// Start from a loaded [`ClientConfig`]
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .base_url(config.base_url.clone())
            .timeout(config.timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use an existing session store. Defaults to an in-memory one.
    pub fn session_store(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Publish to an existing event bus. Defaults to a fresh one.
    pub fn events(mut self, events: AuthEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<PortalClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url:?}: {e}")))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ClientError::Configuration("timeout must be non-zero".into()));
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(PortalClient {
            client,
            base_url,
            session: self.session.unwrap_or_default(),
            events: self.events.unwrap_or_default(),
        })
    }
}

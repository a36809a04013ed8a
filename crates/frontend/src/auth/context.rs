//! Explicit authentication context owned by the application root

use portal_core::{LoginCredentials, Session, UserProfile};
use portal_http::{AuthEvent, ClientError, LoginOutcome, PortalClient};
use tokio::sync::broadcast;

/// Session state and auth actions handed to every screen
///
/// Screens never touch storage directly; they go through this context, which
/// reads the session store behind the client on every call so that a `401`
/// seen by any request is reflected immediately.
#[derive(Clone)]
pub struct AuthContext {
    client: PortalClient,
}

impl AuthContext {
    pub fn new(client: PortalClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session_store().is_authenticated()
    }

    pub fn session(&self) -> Session {
        self.client.session_store().session()
    }

    pub fn stored_user(&self) -> Option<UserProfile> {
        self.client.session_store().stored_user()
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, ClientError> {
        self.client.login(credentials).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.client.logout().await
    }

    /// Fetch the profile from the server and replace the cached one
    pub async fn refresh_user(&self) -> Result<UserProfile, ClientError> {
        let profile = UserProfile::from(self.client.current_user().await?);

        // The token may have been cleared while the request was in flight
        match self.client.session_store().access_token() {
            Some(token) => self.client.session_store().set_session(&token, &profile)?,
            None => debug!("session ended during profile refresh, not caching"),
        }
        Ok(profile)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.client.events().subscribe()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("base_url", &self.client.base_url())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

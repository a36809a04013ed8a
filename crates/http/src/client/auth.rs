//! Authentication endpoints

use super::{ClientError, PortalClient};
use crate::events::AuthEvent;
use portal_core::types::{ApiResponse, CurrentUser, LoginData, UserProfile};
use portal_core::{AccessToken, LoginCredentials};
use reqwest::Method;

const DEFAULT_LOGIN_FAILURE: &str = "Login failed";

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Profile that was stored with the token
    pub user: UserProfile,
    /// Server greeting, if any
    pub message: Option<String>,
}

impl PortalClient {
    /// Log in and store the returned session
    ///
    /// Credentials are validated before anything is sent. A rejection from the
    /// server, whether a `401` or an envelope with `success: false`, comes back
    /// as [`ClientError::Authentication`] carrying the server's message.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, ClientError> {
        credentials.validate()?;

        let request = self.request(Method::POST, "/auth/login").json(credentials);
        let response: ApiResponse<LoginData> = match self.execute(request).await {
            Ok(response) => response,
            Err(ClientError::SessionExpired { message }) => {
                return Err(ClientError::Authentication { message });
            }
            Err(e) => return Err(e),
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string());
            warn!(username = %credentials.username, "login rejected");
            return Err(ClientError::Authentication { message });
        }

        let data = response
            .data
            .ok_or_else(|| ClientError::InvalidResponse("login response has no data".into()))?;
        if data.access_token.is_empty() {
            return Err(ClientError::InvalidResponse(
                "login response has an empty access token".into(),
            ));
        }

        let token = AccessToken::new(data.access_token);
        self.session.set_session(&token, &data.user)?;
        info!(username = %data.user.username, "logged in");

        self.events.publish(AuthEvent::LoggedIn {
            username: data.user.username.clone(),
        });

        Ok(LoginOutcome {
            user: data.user,
            message: response.message,
        })
    }

    /// Log out
    ///
    /// The server is notified on a best-effort basis; its failure is logged and
    /// the local session is cleared regardless.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let request = self.request(Method::POST, "/auth/logout");
        if let Err(e) = self.execute_empty(request).await {
            warn!(error = %e, "logout notification failed, clearing local session anyway");
        }

        self.session.clear_session()?;
        info!("logged out");
        self.events.publish(AuthEvent::LoggedOut);
        Ok(())
    }

    /// Fetch the signed-in user's profile from the server
    pub async fn current_user(&self) -> Result<CurrentUser, ClientError> {
        let request = self.request(Method::GET, "/auth/me");
        let response: ApiResponse<CurrentUser> = self.execute(request).await?;
        into_data(response)
    }

    /// Backend liveness check
    pub async fn health(&self) -> Result<String, ClientError> {
        let request = self.request(Method::GET, "/auth/health");
        let response: ApiResponse<String> = self.execute(request).await?;
        into_data(response)
    }
}

fn into_data<T>(response: ApiResponse<T>) -> Result<T, ClientError> {
    if !response.success {
        return Err(ClientError::InvalidResponse(
            response
                .message
                .unwrap_or_else(|| "request was not successful".to_string()),
        ));
    }
    response
        .data
        .ok_or_else(|| ClientError::InvalidResponse("response has no data".into()))
}

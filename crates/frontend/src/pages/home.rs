//! Home screen

use crate::auth::AuthContext;
use crate::prompt::Confirm;
use crate::routes::Route;
use chrono::{DateTime, Utc};
use portal_core::UserProfile;
use std::fmt::Write as _;

const TOKEN_PREVIEW_LEN: usize = 50;

const LOGOUT_QUESTION: &str = "Are you sure you want to log out?";

/// Features listed on the home screen but not yet available
pub const COMING_SOON: &[&str] = &[
    "User management",
    "Students",
    "Enrollment",
    "Grades",
    "Documents",
    "Chat",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeStatus {
    Loading,
    Ready {
        user: Option<UserProfile>,
        token_preview: String,
        expires_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone)]
pub struct HomePage {
    status: HomeStatus,
    notice: Option<String>,
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            status: HomeStatus::Loading,
            notice: None,
        }
    }

    pub fn status(&self) -> &HomeStatus {
        &self.status
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Load the cached profile, or redirect to login without touching it
    pub fn mount(&mut self, auth: &AuthContext) -> Option<Route> {
        let Some(token) = auth.client().session_store().access_token() else {
            self.status = HomeStatus::Loading;
            return Some(Route::Login);
        };

        self.status = HomeStatus::Ready {
            user: auth.stored_user(),
            token_preview: token.preview(TOKEN_PREVIEW_LEN),
            expires_at: token.expires_at(),
        };
        None
    }

    /// Reload the profile from `/auth/me`
    ///
    /// A `401` has already cleared the session and published an expiry event
    /// by the time this returns; the page answers with a redirect to login.
    pub async fn refresh(&mut self, auth: &AuthContext) -> Option<Route> {
        match auth.refresh_user().await {
            Ok(profile) => {
                if let HomeStatus::Ready { user, .. } = &mut self.status {
                    *user = Some(profile);
                }
                self.notice = None;
                None
            }
            Err(e) if e.is_auth_expired() => Some(Route::Login),
            Err(e) => {
                warn!(error = %e, "failed to refresh profile");
                self.notice = Some(e.user_message());
                None
            }
        }
    }

    /// Log out after the user confirms
    pub async fn logout(&mut self, auth: &AuthContext, confirm: &dyn Confirm) -> Option<Route> {
        if !confirm.confirm(LOGOUT_QUESTION) {
            return None;
        }

        match auth.logout().await {
            Ok(()) => Some(Route::Login),
            Err(e) => {
                error!(error = %e, "logout failed");
                self.notice = Some(e.user_message());
                None
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("== Faculty Portal: Home ==\n");

        let HomeStatus::Ready {
            user,
            token_preview,
            expires_at,
        } = &self.status
        else {
            out.push_str("Loading...\n");
            return out;
        };

        match user {
            Some(user) => {
                let name = if user.full_name.is_empty() {
                    &user.username
                } else {
                    &user.full_name
                };
                let _ = writeln!(out, "Welcome, {name}!");
                let _ = writeln!(out, "Username: {}", user.username);
                let _ = writeln!(out, "Email:    {}", user.email);
                let _ = writeln!(out, "Role:     {}", user.role_name);
                if let Some(description) = &user.role_description {
                    let _ = writeln!(out, "          {description}");
                }
            }
            None => out.push_str("Profile unavailable. Try refreshing.\n"),
        }

        out.push_str("\n-- Session --\n");
        let _ = writeln!(out, "Token:   {token_preview}...");
        match expires_at {
            Some(at) => {
                let _ = writeln!(out, "Expires: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            None => out.push_str("Expires: unknown\n"),
        }

        out.push_str("\n-- Features --\n");
        for feature in COMING_SOON {
            let _ = writeln!(out, "[{feature}] (coming soon)");
        }

        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "\n! {notice}");
        }
        out.push_str("\n[Refresh] [Log out]\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use portal_core::{AccessToken, SessionStore};
    use portal_http::PortalClient;

    mock! {
        pub Prompt {}

        impl Confirm for Prompt {
            fn confirm(&self, question: &str) -> bool;
        }
    }

    fn context() -> AuthContext {
        let client = PortalClient::new("http://127.0.0.1:9", SessionStore::in_memory()).unwrap();
        AuthContext::new(client)
    }

    fn sign_in(auth: &AuthContext, token: &str) {
        let user = UserProfile {
            username: "lecturer01".into(),
            full_name: "Tran Thi B".into(),
            email: "b@x.edu".into(),
            role_name: "Lecturer".into(),
            user_id: Some(3),
            role_description: Some("Teaching staff".into()),
        };
        auth.client()
            .session_store()
            .set_session(&AccessToken::new(token), &user)
            .unwrap();
    }

    #[test]
    fn anonymous_mount_redirects_without_profile() {
        let auth = context();
        let mut page = HomePage::new();

        assert_eq!(page.mount(&auth), Some(Route::Login));
        assert_eq!(page.status(), &HomeStatus::Loading);

        let rendered = page.render();
        assert!(rendered.contains("Loading"));
        assert!(!rendered.contains("Welcome"));
        assert!(!rendered.contains("Token"));
    }

    #[test]
    fn mount_shows_cached_profile() {
        let auth = context();
        sign_in(&auth, "tok");
        let mut page = HomePage::new();

        assert_eq!(page.mount(&auth), None);
        let rendered = page.render();
        assert!(rendered.contains("Welcome, Tran Thi B!"));
        assert!(rendered.contains("Teaching staff"));
        assert!(rendered.contains("Expires: unknown"));
        for feature in COMING_SOON {
            assert!(rendered.contains(feature));
        }
    }

    #[test]
    fn token_preview_is_truncated() {
        let auth = context();
        sign_in(&auth, &"x".repeat(80));
        let mut page = HomePage::new();
        page.mount(&auth);

        let HomeStatus::Ready { token_preview, .. } = page.status() else {
            panic!("expected ready");
        };
        assert_eq!(token_preview.len(), TOKEN_PREVIEW_LEN);
    }

    #[tokio::test]
    async fn declined_logout_keeps_session() {
        let auth = context();
        sign_in(&auth, "tok");
        let mut page = HomePage::new();
        page.mount(&auth);

        let mut prompt = MockPrompt::new();
        prompt
            .expect_confirm()
            .withf(|question| question == LOGOUT_QUESTION)
            .times(1)
            .return_const(false);

        assert_eq!(page.logout(&auth, &prompt).await, None);
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn confirmed_logout_clears_even_when_server_is_down() {
        let auth = context();
        sign_in(&auth, "tok");
        let mut page = HomePage::new();
        page.mount(&auth);

        let mut prompt = MockPrompt::new();
        prompt.expect_confirm().times(1).return_const(true);

        assert_eq!(page.logout(&auth, &prompt).await, Some(Route::Login));
        assert!(!auth.is_authenticated());
        assert!(auth.stored_user().is_none());
    }
}

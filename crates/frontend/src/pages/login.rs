//! Login screen

use crate::auth::AuthContext;
use crate::routes::Route;
use portal_core::{LoginCredentials, validation::validate_email};
use portal_http::{ClientError, LoginOutcome};
use std::fmt::{self, Write as _};

const FORGOT_PASSWORD_ACK: &str =
    "Password reset is not available yet. Please contact an administrator for help.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    Editing,
    /// A login request is in flight; further submits are ignored
    Submitting,
    Error(String),
    ForgotPassword {
        email: String,
        notice: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Clone)]
pub struct LoginPage {
    username: String,
    password: String,
    status: LoginStatus,
    notice: Option<String>,
}

impl fmt::Debug for LoginPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPage")
            .field("username", &self.username)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Default for LoginPage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            status: LoginStatus::Editing,
            notice: None,
        }
    }

    pub fn status(&self) -> &LoginStatus {
        &self.status
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Acknowledgement left by the forgot-password flow
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.status == LoginStatus::Submitting
    }

    /// Signed-in users are sent straight home
    pub fn mount(&mut self, auth: &AuthContext) -> Option<Route> {
        auth.is_authenticated().then_some(Route::Home)
    }

    pub fn input(&mut self, field: LoginField, value: impl Into<String>) {
        match field {
            LoginField::Username => self.username = value.into(),
            LoginField::Password => self.password = value.into(),
        }
        if matches!(self.status, LoginStatus::Error(_)) {
            self.status = LoginStatus::Editing;
        }
    }

    /// Validate the form and move to `Submitting`
    ///
    /// Returns the credentials to send, or `None` when a request is already
    /// pending, the forgot-password panel is open, or validation failed (the
    /// page then shows the validation message).
    pub fn begin_submit(&mut self) -> Option<LoginCredentials> {
        match self.status {
            LoginStatus::Submitting | LoginStatus::ForgotPassword { .. } => return None,
            LoginStatus::Editing | LoginStatus::Error(_) => {}
        }

        let credentials = LoginCredentials::new(self.username.clone(), self.password.clone());
        if let Err(e) = credentials.validate() {
            self.status = LoginStatus::Error(e.to_string());
            return None;
        }

        self.notice = None;
        self.status = LoginStatus::Submitting;
        Some(credentials)
    }

    /// Apply the outcome of a login request started by [`Self::begin_submit`]
    pub fn finish_submit(&mut self, result: Result<LoginOutcome, ClientError>) -> Option<Route> {
        if !self.is_submitting() {
            return None;
        }

        match result {
            Ok(_) => {
                self.password.clear();
                self.status = LoginStatus::Editing;
                Some(Route::Home)
            }
            Err(e) => {
                self.status = LoginStatus::Error(e.user_message());
                None
            }
        }
    }

    pub async fn submit(&mut self, auth: &AuthContext) -> Option<Route> {
        let credentials = self.begin_submit()?;
        let result = auth.login(&credentials).await;
        self.finish_submit(result)
    }

    pub fn open_forgot_password(&mut self) {
        if self.is_submitting() {
            return;
        }
        self.status = LoginStatus::ForgotPassword {
            email: String::new(),
            notice: None,
        };
    }

    pub fn input_email(&mut self, value: impl Into<String>) {
        if let LoginStatus::ForgotPassword { email, notice } = &mut self.status {
            *email = value.into();
            *notice = None;
        }
    }

    /// Acknowledge a reset request. Nothing is sent to the server.
    pub fn submit_forgot_password(&mut self) {
        let LoginStatus::ForgotPassword { email, notice } = &mut self.status else {
            return;
        };

        if let Err(e) = validate_email(email) {
            *notice = Some(e.to_string());
            return;
        }

        info!("password reset requested");
        self.notice = Some(FORGOT_PASSWORD_ACK.to_string());
        self.status = LoginStatus::Editing;
    }

    pub fn close_forgot_password(&mut self) {
        if matches!(self.status, LoginStatus::ForgotPassword { .. }) {
            self.status = LoginStatus::Editing;
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("== Faculty Portal: Sign in ==\n");

        if let LoginStatus::ForgotPassword { email, notice } = &self.status {
            out.push_str("-- Forgot password --\n");
            let _ = writeln!(out, "Email: {email}");
            if let Some(notice) = notice {
                let _ = writeln!(out, "! {notice}");
            }
            out.push_str("[Send request] [Back to sign in]\n");
            return out;
        }

        let _ = writeln!(out, "Username: {}", self.username);
        let _ = writeln!(out, "Password: {}", "*".repeat(self.password.chars().count()));

        match &self.status {
            LoginStatus::Submitting => out.push_str("[Signing in...]\n"),
            LoginStatus::Error(message) => {
                let _ = writeln!(out, "! {message}");
                out.push_str("[Sign in]\n");
            }
            _ => out.push_str("[Sign in]\n"),
        }

        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "i {notice}");
        }
        out.push_str("[Forgot password?]\n");
        out
    }
}

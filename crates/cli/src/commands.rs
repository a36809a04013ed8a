//! CLI commands

use anyhow::{Context as _, Result, anyhow, bail};
use clap::Subcommand;
use portal_core::{FileStorage, Session, SessionStore};
use portal_frontend::{
    App, AssumeYes, AuthContext, HomePage, LoginField, LoginPage, LoginStatus, Route,
};
use portal_http::{ClientError, PortalClientBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::PortalSettings;
use crate::prompt::{self, StdinConfirm};
use crate::state_dir::StateDir;

const NOT_SIGNED_IN: &str = "Not signed in. Run `portal login` first";

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Password (prompted when omitted)
        #[arg(short, long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and clear the stored session
    Logout {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the home screen for the stored session
    Home,

    /// Fetch the signed-in user's profile from the server
    Me,

    /// Summarize the stored session
    Status,

    /// Check that the backend is reachable
    Health,

    /// Request a password reset
    ForgotPassword {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Use the login and home screens interactively
    Interactive,
}

/// Everything a command needs, built once from settings
pub struct Context {
    pub auth: AuthContext,
    pub session_path: Option<PathBuf>,
}

impl Context {
    pub fn open(settings: &PortalSettings, state_dir: &StateDir, ephemeral: bool) -> Result<Self> {
        let (store, session_path) = if ephemeral {
            debug!("Using in-memory session");
            (SessionStore::in_memory(), None)
        } else {
            state_dir.create_directories()?;
            let path = state_dir.session_path();
            let storage = FileStorage::open(path.clone())
                .with_context(|| format!("Failed to open session file {}", path.display()))?;
            (SessionStore::new(Arc::new(storage)), Some(path))
        };

        let client = PortalClientBuilder::from_config(&settings.api)
            .session_store(store)
            .build()?;
        info!(base_url = %client.base_url(), "Portal client ready");

        Ok(Self {
            auth: AuthContext::new(client),
            session_path,
        })
    }
}

impl Commands {
    pub async fn execute(self, context: &Context) -> Result<()> {
        match self {
            Self::Login { username, password } => login(context, username, password).await,
            Self::Logout { yes } => logout(context, yes).await,
            Self::Home => home(context),
            Self::Me => me(context).await,
            Self::Status => {
                status(context);
                Ok(())
            }
            Self::Health => health(context).await,
            Self::ForgotPassword { email } => forgot_password(email),
            Self::Interactive => interactive(context).await,
        }
    }
}

/// Log the full error and keep only the displayable text
fn report(error: ClientError) -> anyhow::Error {
    debug!(error = ?error, "Request failed");
    anyhow!(error.user_message())
}

async fn login(context: &Context, username: Option<String>, password: Option<String>) -> Result<()> {
    let mut app = App::start(context.auth.clone(), Route::Login.path());
    if app.route() == Route::Home {
        let name = context
            .auth
            .stored_user()
            .map(|user| user.username)
            .unwrap_or_default();
        println!("Already signed in as {name}");
        return Ok(());
    }

    let username = match username {
        Some(username) => username,
        None => prompt::read_line("Username: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt::read_password("Password: ")?,
    };

    fill_login(&mut app, username, password);
    app.submit_login().await;

    if app.route() == Route::Home {
        print!("{}", app.render());
        return Ok(());
    }
    Err(login_failure(&mut app))
}

fn fill_login(app: &mut App, username: String, password: String) {
    if let Some(page) = app.login_page_mut() {
        page.input(LoginField::Username, username);
        page.input(LoginField::Password, password);
    }
}

fn login_failure(app: &mut App) -> anyhow::Error {
    match app.login_page_mut().map(|page| page.status().clone()) {
        Some(LoginStatus::Error(message)) => anyhow!(message),
        _ => anyhow!("Login did not complete"),
    }
}

async fn logout(context: &Context, yes: bool) -> Result<()> {
    let mut app = App::start(context.auth.clone(), Route::Home.path());
    if app.route() != Route::Home {
        println!("Not signed in");
        return Ok(());
    }

    if yes {
        app.logout(&AssumeYes).await;
    } else {
        app.logout(&StdinConfirm).await;
    }

    if app.route() == Route::Login {
        println!("Logged out");
        return Ok(());
    }
    if let Some(notice) = app.home_page().and_then(HomePage::notice) {
        bail!("{notice}");
    }
    println!("Logout cancelled");
    Ok(())
}

fn home(context: &Context) -> Result<()> {
    let app = App::start(context.auth.clone(), Route::Home.path());
    if app.route() != Route::Home {
        bail!(NOT_SIGNED_IN);
    }
    print!("{}", app.render());
    Ok(())
}

async fn me(context: &Context) -> Result<()> {
    if !context.auth.is_authenticated() {
        bail!(NOT_SIGNED_IN);
    }

    let user = context.auth.client().current_user().await.map_err(report)?;
    println!("Username:    {}", user.username);
    let optional = [
        ("User ID", user.user_id.map(|id| id.to_string())),
        ("Full name", user.full_name),
        ("Email", user.email),
        ("Phone", user.phone),
        ("Role", user.role_name),
        ("Description", user.role_description),
        ("Active", user.is_active.map(|active| active.to_string())),
        ("Last login", user.last_login),
        ("Created", user.created_at),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            println!("{:<12} {value}", format!("{label}:"));
        }
    }
    Ok(())
}

fn status(context: &Context) {
    match context.auth.session() {
        Session::Anonymous => println!("Not signed in"),
        Session::Authenticated { token, user } => {
            println!("Signed in as {} ({})", user.username, user.full_name);
            println!("Role:    {}", user.role_name);
            println!("Token:   {}...", token.preview(16));
            match token.expires_at() {
                Some(at) => println!("Expires: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
                None => println!("Expires: unknown"),
            }
        }
    }

    println!("Server:  {}", context.auth.client().base_url());
    match &context.session_path {
        Some(path) => println!("Session: {}", path.display()),
        None => println!("Session: in memory"),
    }
}

async fn health(context: &Context) -> Result<()> {
    let status = context.auth.client().health().await.map_err(report)?;
    println!("{} is up: {status}", context.auth.client().base_url());
    Ok(())
}

fn forgot_password(email: Option<String>) -> Result<()> {
    let mut page = LoginPage::new();
    page.open_forgot_password();

    let email = match email {
        Some(email) => email,
        None => prompt::read_line("Email: ")?,
    };
    page.input_email(email);
    page.submit_forgot_password();

    if let LoginStatus::ForgotPassword {
        notice: Some(notice),
        ..
    } = page.status()
    {
        bail!("{notice}");
    }
    println!("{}", page.notice().unwrap_or_default());
    Ok(())
}

async fn interactive(context: &Context) -> Result<()> {
    let mut app = App::start(context.auth.clone(), "/");

    loop {
        println!("{}", app.render());
        let keep_going = match app.route() {
            Route::Login => login_turn(&mut app).await?,
            Route::Home => home_turn(&mut app).await?,
        };
        if !keep_going {
            return Ok(());
        }
    }
}

async fn login_turn(app: &mut App) -> Result<bool> {
    let in_forgot_password = app
        .login_page_mut()
        .is_some_and(|page| matches!(page.status(), LoginStatus::ForgotPassword { .. }));

    if in_forgot_password {
        let email = prompt::read_line("Email (b to go back): ")?;
        if let Some(page) = app.login_page_mut() {
            if email.trim() == "b" {
                page.close_forgot_password();
            } else {
                page.input_email(email);
                page.submit_forgot_password();
            }
        }
        return Ok(true);
    }

    match prompt::read_line("[l]ogin, [f]orgot password, [q]uit: ")?.trim() {
        "" | "l" => {
            let username = prompt::read_line("Username: ")?;
            let password = prompt::read_password("Password: ")?;
            fill_login(app, username, password);
            app.submit_login().await;
        }
        "f" => {
            if let Some(page) = app.login_page_mut() {
                page.open_forgot_password();
            }
        }
        "q" => return Ok(false),
        other => println!("Unknown choice: {other}"),
    }
    Ok(true)
}

async fn home_turn(app: &mut App) -> Result<bool> {
    match prompt::read_line("[r]efresh, [l]ogout, [q]uit: ")?.trim() {
        "r" => app.refresh_home().await,
        "l" => app.logout(&StdinConfirm).await,
        "q" => return Ok(false),
        other => println!("Unknown choice: {other}"),
    }
    Ok(true)
}

//! Faculty portal screens
//!
//! The view layer is headless: each screen is a state machine that renders to
//! text, and [`App`] owns the router, the current screen and the
//! [`AuthContext`]. A front end feeds user input in and prints what comes out.

#[macro_use]
extern crate tracing;

pub mod app;
pub mod auth;
pub mod pages;
pub mod prompt;
pub mod routes;

pub use app::{App, Screen};
pub use auth::AuthContext;
pub use pages::{HomePage, HomeStatus, LoginField, LoginPage, LoginStatus};
pub use prompt::{AssumeYes, Confirm};
pub use routes::{Route, Router};

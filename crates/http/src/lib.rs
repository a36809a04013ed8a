//! Faculty portal HTTP client
//!
//! [`PortalClient`] talks to the portal backend. It attaches the stored
//! access token to every request and, when any response comes back `401`,
//! clears the session and announces it on [`AuthEvents`]. Deciding where to
//! navigate after that is left to whoever subscribes.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod events;

pub use client::{
    LoginOutcome, PortalClient, PortalClientBuilder, config::ClientConfig, error::ClientError,
};
pub use events::{AuthEvent, AuthEvents};

//! Authentication events
//!
//! Session changes made by the client are published here instead of being
//! acted on in place. The application root subscribes and routes.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Session transitions observed by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A login succeeded and the session was stored
    LoggedIn { username: String },
    /// The user logged out; the local session is gone
    LoggedOut,
    /// A request came back `401`; the local session was cleared
    SessionExpired,
}

/// Broadcast bus for [`AuthEvent`]s
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers. Without subscribers the event is dropped.
    pub fn publish(&self, event: AuthEvent) {
        debug!(?event, "publishing auth event");
        let _ = self.sender.send(event);
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

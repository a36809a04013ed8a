//! Session store accessor

use crate::error::StorageError;
use crate::session::{AccessToken, Session};
use crate::storage::{KeyValueStorage, MemoryStorage};
use crate::types::UserProfile;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Storage key holding the raw access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key holding the JSON-encoded [`UserProfile`]
pub const USER_KEY: &str = "user";

/// Reads and writes the persisted session
///
/// Cloning is cheap and every clone shares the same storage. There is no
/// cross-process notification: a session cleared by another process is only
/// seen on the next read.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// True iff an access token is stored. Does not check expiry.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.read(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(AccessToken::new)
    }

    /// The cached profile, or `None` when it is missing or cannot be decoded
    pub fn stored_user(&self) -> Option<UserProfile> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user profile is malformed, ignoring it");
                None
            }
        }
    }

    /// Authenticated only when both a token and a readable profile are stored
    pub fn session(&self) -> Session {
        match (self.access_token(), self.stored_user()) {
            (Some(token), Some(user)) => Session::Authenticated { token, user },
            _ => Session::Anonymous,
        }
    }

    /// Replace the stored token and profile together
    pub fn set_session(&self, token: &AccessToken, user: &UserProfile) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(user)?;
        self.storage.set_items(&[
            (ACCESS_TOKEN_KEY, token.as_str()),
            (USER_KEY, serialized.as_str()),
        ])?;
        info!(username = %user.username, "session stored");
        Ok(())
    }

    /// Remove both keys. Clearing an empty store is a no-op.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.storage.remove_items(&[ACCESS_TOKEN_KEY, USER_KEY])?;
        info!("session cleared");
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read session storage");
                None
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

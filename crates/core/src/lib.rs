//! Faculty portal core types and session storage
//!
//! The session is persisted as two keys in a [`KeyValueStorage`]: the raw
//! access token and the JSON-encoded [`UserProfile`]. [`SessionStore`] is the
//! only reader and writer of those keys.

pub mod error;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;
pub mod validation;

pub use error::StorageError;
pub use session::{AccessToken, Session};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{ACCESS_TOKEN_KEY, SessionStore, USER_KEY};
pub use types::{ApiResponse, CurrentUser, LoginData, UserProfile};
pub use validation::{LoginCredentials, ValidationError};

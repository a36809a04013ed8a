//! Authentication context shared by the screens

mod context;

pub use context::AuthContext;

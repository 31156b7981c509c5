//! Authentication Provider
//!
//! The client never talks to the identity service directly; it goes
//! through an [`AuthProvider`], which hands back a [`Session`] whose access
//! token is then attached to backend requests.
//!
//! Only an in-process provider ships with the crate ([`MemoryAuthProvider`]),
//! seeded either by tests or from the `[auth]` section of the config file.

mod memory;

pub use memory::MemoryAuthProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// Signed-in session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Common trait for identity providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Email/password sign-in
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Register a new account; the user signs in afterwards
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// End the current session
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Current session, if any
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Rebuild a session from a token persisted by an earlier run
    async fn resume_session(&self, _access_token: &str) -> Result<Option<Session>, AuthError> {
        Ok(None)
    }
}

/// Errors reported by an auth provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("User already registered")]
    AlreadyRegistered,

    #[error("Unable to validate email address: invalid format")]
    InvalidEmail,

    #[error("Signups not allowed for this instance")]
    SignUpDisabled,

    #[error("{0}")]
    Provider(String),
}

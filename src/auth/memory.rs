//! In-process auth provider

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{AuthError, AuthProvider, Session, User};
use crate::config::AuthConfig;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: User,
    access_token: String,
}

/// Auth provider keeping accounts in memory
///
/// Accounts come from [`AuthConfig`] or are registered through
/// [`sign_up`](AuthProvider::sign_up) when sign-ups are enabled.
#[derive(Debug)]
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<Session>>,
    allow_sign_up: bool,
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthProvider {
    /// Empty provider accepting sign-ups
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            allow_sign_up: true,
        }
    }

    /// Provider seeded from configuration
    pub fn from_config(config: &AuthConfig) -> Self {
        let provider = Self {
            allow_sign_up: config.allow_sign_up,
            ..Self::new()
        };
        for account in &config.accounts {
            provider.insert_account(
                &account.email,
                &account.password,
                &account.user_id,
                &account.access_token,
            );
        }
        provider
    }

    /// Register an account with a fixed id and token
    pub fn with_account(self, email: &str, password: &str, user_id: &str, access_token: &str) -> Self {
        self.insert_account(email, password, user_id, access_token);
        self
    }

    fn insert_account(&self, email: &str, password: &str, user_id: &str, access_token: &str) {
        let account = Account {
            password: password.to_string(),
            user: User {
                id: user_id.to_string(),
                email: normalize_email(email),
            },
            access_token: access_token.to_string(),
        };
        self.accounts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(normalize_email(email), account);
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> AuthError {
        AuthError::Provider(format!("Auth state unavailable: {}", e))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account = {
            let accounts = self.accounts.read().map_err(Self::lock_error)?;
            accounts.get(&normalize_email(email)).cloned()
        };

        let account = match account {
            Some(account) if account.password == password => account,
            _ => return Err(AuthError::InvalidCredentials),
        };

        let session = Session {
            access_token: account.access_token,
            user: account.user,
        };
        *self.session.write().map_err(Self::lock_error)? = Some(session.clone());

        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if !self.allow_sign_up {
            return Err(AuthError::SignUpDisabled);
        }

        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let mut accounts = self.accounts.write().map_err(Self::lock_error)?;
        if accounts.contains_key(&email) {
            return Err(AuthError::AlreadyRegistered);
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
        };
        accounts.insert(
            email,
            Account {
                password: password.to_string(),
                user: user.clone(),
                access_token: uuid::Uuid::new_v4().simple().to_string(),
            },
        );

        tracing::info!(user_id = %user.id, "Registered account");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.write().map_err(Self::lock_error)? = None;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.session.read().map_err(Self::lock_error)?.clone())
    }

    async fn resume_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let session = {
            let accounts = self.accounts.read().map_err(Self::lock_error)?;
            accounts
                .values()
                .find(|a| a.access_token == access_token)
                .map(|a| Session {
                    access_token: a.access_token.clone(),
                    user: a.user.clone(),
                })
        };

        if let Some(session) = &session {
            *self.session.write().map_err(Self::lock_error)? = Some(session.clone());
        }
        Ok(session)
    }
}

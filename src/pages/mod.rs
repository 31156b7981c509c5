//! Pages
//!
//! Each page renders itself into the mount when routed to and exposes the
//! user actions available on it. Actions take the [`Router`] so they can
//! navigate and write to the screen.
//!
//! Actions show validation and backend errors on screen and return `Ok`.
//! Only an expired session comes back as [`PageError::Unauthorized`], which
//! the caller hands to [`Router::recover`].
//!
//! [`Router`]: crate::router::Router
//! [`Router::recover`]: crate::router::Router::recover

pub mod dashboard;
pub mod login;
pub mod notes;
pub mod signup;
pub mod workspace;

pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use notes::{NotesSection, NotesState};
pub use signup::SignupPage;
pub use workspace::WorkspacePage;

use std::sync::Arc;

use crate::api::{resolve_error_message, ApiClient, ApiOutcome};
use crate::auth::AuthProvider;
use crate::router::PageResult;
use crate::state::Store;
use crate::storage::KeyValueStorage;

/// Services shared by all pages
#[derive(Clone)]
pub struct PageContext {
    pub api: Arc<ApiClient>,
    pub store: Store,
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn KeyValueStorage>,
}

impl PageContext {
    pub fn new(
        api: Arc<ApiClient>,
        store: Store,
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            api,
            store,
            auth,
            storage,
        }
    }
}

/// Split a request result into its payload or the message to show
///
/// A 401 escapes as [`PageError::Unauthorized`](crate::router::PageError).
pub(crate) fn settle<T>(outcome: ApiOutcome<T>) -> PageResult<Result<Option<T>, String>> {
    let response = outcome.authorized()?;
    Ok(response
        .into_result()
        .map_err(|error| resolve_error_message(Some(&error))))
}

/// Message of a failed auth call, or `fallback` when it is blank
pub(crate) fn auth_message(error: &crate::auth::AuthError, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_message_fallback() {
        let blank = crate::auth::AuthError::Provider(" ".into());
        assert_eq!(auth_message(&blank, "Login failed"), "Login failed");
        assert_eq!(
            auth_message(&crate::auth::AuthError::InvalidCredentials, "Login failed"),
            "Invalid login credentials"
        );
    }
}

//! Application wiring
//!
//! Builds the services from [`Config`], registers the routes and restores
//! a previous session on start.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ClientError, StorageTokenProvider};
use crate::auth::{AuthProvider, MemoryAuthProvider};
use crate::config::Config;
use crate::pages::{DashboardPage, LoginPage, PageContext, SignupPage, WorkspacePage};
use crate::router::{
    RedirectPage, RouteOptions, RouteResolution, Router, DASHBOARD, LOGIN, ROOT, SIGNUP,
    WORKSPACE,
};
use crate::state::Store;
use crate::storage::{FileStorage, KeyValueStorage, StorageError, ACCESS_TOKEN_KEY};
use crate::view::Mount;

/// Startup failures
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("API client error: {0}")]
    Client(#[from] ClientError),
}

/// The running client: router plus the pages whose actions the shell calls
pub struct App {
    pub router: Router,
    pub login: Arc<LoginPage>,
    pub signup: Arc<SignupPage>,
    pub dashboard: Arc<DashboardPage>,
    pub workspace: Arc<WorkspacePage>,
    ctx: PageContext,
}

impl App {
    /// Register every route against `mount`
    pub fn new(ctx: PageContext, mount: Mount) -> Self {
        let router = Router::new(ctx.store.clone(), mount, Arc::clone(&ctx.storage));

        let login = Arc::new(LoginPage::new(ctx.clone()));
        let signup = Arc::new(SignupPage::new(ctx.clone()));
        let dashboard = Arc::new(DashboardPage::new(ctx.clone()));
        let workspace = Arc::new(WorkspacePage::new(ctx.clone()));

        router.add_route(ROOT, Arc::new(RedirectPage::new(DASHBOARD)), RouteOptions::public());
        router.add_route(LOGIN, login.clone(), RouteOptions::public());
        router.add_route(SIGNUP, signup.clone(), RouteOptions::public());
        router.add_route(DASHBOARD, dashboard.clone(), RouteOptions::auth());
        router.add_route(WORKSPACE, workspace.clone(), RouteOptions::auth_and_tenant());

        Self {
            router,
            login,
            signup,
            dashboard,
            workspace,
            ctx,
        }
    }

    /// Build storage, API client and auth provider from configuration
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let path = config.storage.resolved_path();
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::open(&path)?);
        tracing::info!(path = %path.display(), "Using client storage");

        let token_provider = Arc::new(StorageTokenProvider::new(Arc::clone(&storage)));
        let api = ApiClient::new(config.api.client_config(), token_provider)?;
        tracing::info!(base_url = %api.base_url(), "Using notes backend");

        let auth: Arc<dyn AuthProvider> = Arc::new(MemoryAuthProvider::from_config(&config.auth));
        let store = Store::new(Arc::clone(&storage));

        let ctx = PageContext::new(Arc::new(api), store, auth, storage);
        Ok(Self::new(ctx, Mount::new()))
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    /// Sign back in with a persisted access token
    ///
    /// A token the provider no longer knows is removed.
    pub async fn restore_session(&self) -> bool {
        let Some(token) = self.ctx.storage.get_item(ACCESS_TOKEN_KEY) else {
            return false;
        };

        match self.ctx.auth.resume_session(&token).await {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.user.id, "Restored session");
                self.ctx.store.set_user(Some(session.user));
                true
            }
            Ok(None) => {
                tracing::info!("Stored session is no longer valid");
                if let Err(e) = self.ctx.storage.remove_item(ACCESS_TOKEN_KEY) {
                    tracing::warn!(error = %e, "Failed to remove access token");
                }
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore session");
                false
            }
        }
    }

    /// Restore the session and route to `path`
    pub async fn start(&self, path: &str) -> RouteResolution {
        self.restore_session().await;
        self.router.navigate(path).await
    }

    /// Log every store change until the store is dropped
    pub fn spawn_event_logger(&self) -> JoinHandle<()> {
        let mut events = self.ctx.store.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => tracing::debug!(
                        event = event.kind.name(),
                        signed_in = event.snapshot.user.is_some(),
                        tenant_id = ?event.snapshot.active_tenant_id,
                        "Store changed"
                    ),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Store event logger lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

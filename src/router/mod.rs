//! Router
//!
//! Hash-style path routing with guards. A route maps a path to a [`Page`]
//! and declares whether it needs a signed-in user and a selected tenant.
//!
//! Every render runs under its own [`CancellationToken`] and mount
//! generation. Starting a new render cancels the previous one, so the
//! latest navigation always wins and older renders cannot write to the
//! screen once superseded.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::api::Unauthorized;
use crate::state::Store;
use crate::storage::{KeyValueStorage, ACCESS_TOKEN_KEY};
use crate::view::{components, Mount, MountHandle};

pub const ROOT: &str = "/";
pub const LOGIN: &str = "/login";
pub const SIGNUP: &str = "/signup";
pub const DASHBOARD: &str = "/dashboard";
pub const WORKSPACE: &str = "/workspace";

/// Redirect hops followed inside one `handle_route` call
pub const MAX_REDIRECTS: usize = 8;

/// Paths only meaningful while signed out
const GUEST_ONLY: [&str; 2] = [LOGIN, SIGNUP];

/// Route preconditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOptions {
    pub auth: bool,
    pub tenant: bool,
}

impl RouteOptions {
    pub const fn public() -> Self {
        Self {
            auth: false,
            tenant: false,
        }
    }

    pub const fn auth() -> Self {
        Self {
            auth: true,
            tenant: false,
        }
    }

    pub const fn auth_and_tenant() -> Self {
        Self {
            auth: true,
            tenant: true,
        }
    }
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self::auth()
    }
}

/// Everything a page needs to draw one render
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub path: String,
    pub token: CancellationToken,
    pub mount: MountHandle,
}

/// What a page did with its render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Redirect(String),
}

/// Page failures the router acts on
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("session expired")]
    Unauthorized,

    #[error("{0}")]
    Failed(String),
}

impl From<Unauthorized> for PageError {
    fn from(_: Unauthorized) -> Self {
        PageError::Unauthorized
    }
}

pub type PageResult<T> = Result<T, PageError>;

/// A routable screen
#[async_trait]
pub trait Page: Send + Sync {
    async fn render(&self, ctx: RenderContext) -> PageResult<RenderOutcome>;
}

/// Page that only forwards to another path
pub struct RedirectPage {
    target: String,
}

impl RedirectPage {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl Page for RedirectPage {
    async fn render(&self, _ctx: RenderContext) -> PageResult<RenderOutcome> {
        Ok(RenderOutcome::Redirect(self.target.clone()))
    }
}

/// Result of one `handle_route` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResolution {
    /// The page at this path is on screen
    Rendered(String),
    /// A newer navigation took over while this one was rendering
    Superseded,
    /// Redirects did not settle within [`MAX_REDIRECTS`] hops
    RedirectLoop(String),
    /// The page failed; an error alert is on screen
    Failed(String),
}

/// Guard verdict for a path
enum Guard {
    Render(Arc<dyn Page>),
    Redirect(&'static str),
}

struct Route {
    page: Arc<dyn Page>,
    options: RouteOptions,
}

struct RouterInner {
    routes: RwLock<HashMap<String, Route>>,
    location: RwLock<String>,
    current: Mutex<Option<CancellationToken>>,
    in_flight: AtomicUsize,
    store: Store,
    storage: Arc<dyn KeyValueStorage>,
    mount: Mount,
}

/// Marks a `handle_route` call as in progress until dropped
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared router handle
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

/// Strip the leading `#`; an empty path is the root
pub fn normalize_path(raw: &str) -> String {
    let path = raw.trim();
    let path = path.strip_prefix('#').unwrap_or(path);
    if path.is_empty() {
        ROOT.to_string()
    } else {
        path.to_string()
    }
}

impl Router {
    pub fn new(store: Store, mount: Mount, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                routes: RwLock::new(HashMap::new()),
                location: RwLock::new(ROOT.to_string()),
                current: Mutex::new(None),
                in_flight: AtomicUsize::new(0),
                store,
                storage,
                mount,
            }),
        }
    }

    pub fn add_route(&self, path: &str, page: Arc<dyn Page>, options: RouteOptions) {
        let mut routes = self.inner.routes.write().unwrap_or_else(|e| e.into_inner());
        routes.insert(normalize_path(path), Route { page, options });
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn mount(&self) -> &Mount {
        &self.inner.mount
    }

    pub fn current_path(&self) -> String {
        self.inner
            .location
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Update the location without routing
    pub fn set_location(&self, path: &str) {
        *self.inner.location.write().unwrap_or_else(|e| e.into_inner()) = normalize_path(path);
    }

    /// True while any `handle_route` call is in progress
    pub fn is_handling(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Write access to the screen for actions outside a render
    pub fn current_handle(&self) -> MountHandle {
        let token = self
            .inner
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_default();
        self.inner.mount.handle(token)
    }

    /// Go to `path`, re-rendering when already there
    pub async fn navigate(&self, path: &str) -> RouteResolution {
        let target = normalize_path(path);
        if target != self.current_path() {
            tracing::info!(from = %self.current_path(), to = %target, "Navigate");
            self.set_location(&target);
        }
        self.handle_route().await
    }

    /// Resolve the current location, apply guards and render
    pub async fn handle_route(&self) -> RouteResolution {
        let _in_flight = InFlight::enter(&self.inner.in_flight);
        let mut path = self.current_path();

        for _ in 0..MAX_REDIRECTS {
            let page = match self.check_guards(&path) {
                Guard::Render(page) => page,
                Guard::Redirect(target) => {
                    path = normalize_path(target);
                    self.set_location(&path);
                    continue;
                }
            };

            let token = self.start_render();
            let handle = self.inner.mount.begin(token.clone());
            let ctx = RenderContext {
                path: path.clone(),
                token,
                mount: handle.clone(),
            };

            tracing::debug!(path = %path, generation = handle.generation(), "Rendering");
            let result = page.render(ctx).await;

            if !handle.is_current() {
                tracing::debug!(path = %path, "Render superseded");
                return RouteResolution::Superseded;
            }

            match result {
                Ok(RenderOutcome::Rendered) => return RouteResolution::Rendered(path),
                Ok(RenderOutcome::Redirect(target)) => {
                    path = normalize_path(&target);
                    self.set_location(&path);
                }
                Err(PageError::Unauthorized) => {
                    self.handle_unauthorized();
                    path = LOGIN.to_string();
                    self.set_location(&path);
                }
                Err(PageError::Failed(message)) => {
                    tracing::warn!(path = %path, error = %message, "Page failed");
                    handle.push(components::error_alert(message.clone()));
                    return RouteResolution::Failed(message);
                }
            }
        }

        tracing::warn!(path = %path, "Redirect loop");
        RouteResolution::RedirectLoop(path)
    }

    /// Drop the session after the backend rejected the token
    pub fn handle_unauthorized(&self) {
        tracing::info!("Session rejected by backend, signing out");
        if let Err(e) = self.inner.storage.remove_item(ACCESS_TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to remove access token");
        }
        self.inner.store.set_user(None);
    }

    /// Handle an error returned by a page action
    ///
    /// An expired session ends at the login page; anything else is shown as
    /// an alert on the current screen.
    pub async fn recover(&self, error: PageError) -> RouteResolution {
        match error {
            PageError::Unauthorized => {
                self.handle_unauthorized();
                self.navigate(LOGIN).await
            }
            PageError::Failed(message) => {
                self.current_handle()
                    .push(components::error_alert(message.clone()));
                RouteResolution::Failed(message)
            }
        }
    }

    fn check_guards(&self, path: &str) -> Guard {
        let routes = self.inner.routes.read().unwrap_or_else(|e| e.into_inner());
        let Some(route) = routes.get(path) else {
            tracing::debug!(path = %path, "Unknown route");
            return Guard::Redirect(DASHBOARD);
        };

        let store = &self.inner.store;
        if route.options.auth && !store.is_authenticated() {
            return Guard::Redirect(LOGIN);
        }
        if GUEST_ONLY.contains(&path) && store.is_authenticated() {
            return Guard::Redirect(DASHBOARD);
        }
        if route.options.tenant && store.active_tenant_id().is_none() {
            tracing::warn!(path = %path, "No tenant selected, redirecting to dashboard");
            return Guard::Redirect(DASHBOARD);
        }

        Guard::Render(Arc::clone(&route.page))
    }

    /// Cancel the running render and hand out the token for the next one
    fn start_render(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self.inner.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use crate::storage::{MemoryStorage, ACTIVE_TENANT_ID_KEY};
    use crate::view::Block;
    use tokio::sync::Notify;

    struct TextPage(&'static str);

    #[async_trait]
    impl Page for TextPage {
        async fn render(&self, ctx: RenderContext) -> PageResult<RenderOutcome> {
            ctx.mount.push(Block::Text(self.0.to_string()));
            Ok(RenderOutcome::Rendered)
        }
    }

    struct FailingPage(PageError);

    #[async_trait]
    impl Page for FailingPage {
        async fn render(&self, _ctx: RenderContext) -> PageResult<RenderOutcome> {
            Err(self.0.clone())
        }
    }

    /// Signals `started`, then waits for `release` before drawing
    struct SlowPage {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Page for SlowPage {
        async fn render(&self, ctx: RenderContext) -> PageResult<RenderOutcome> {
            self.started.notify_one();
            self.release.notified().await;
            ctx.mount.push(Block::Text("slow page".into()));
            Ok(RenderOutcome::Rendered)
        }
    }

    fn user() -> User {
        User {
            id: "u-1".into(),
            email: "ada@example.com".into(),
        }
    }

    fn router_with(storage: Arc<MemoryStorage>) -> Router {
        let store = Store::new(storage.clone());
        let router = Router::new(store, Mount::new(), storage);
        router.add_route(ROOT, Arc::new(RedirectPage::new(DASHBOARD)), RouteOptions::public());
        router.add_route(LOGIN, Arc::new(TextPage("login page")), RouteOptions::public());
        router.add_route(SIGNUP, Arc::new(TextPage("signup page")), RouteOptions::public());
        router.add_route(DASHBOARD, Arc::new(TextPage("dashboard page")), RouteOptions::auth());
        router.add_route(
            WORKSPACE,
            Arc::new(TextPage("workspace page")),
            RouteOptions::auth_and_tenant(),
        );
        router
    }

    fn router() -> Router {
        router_with(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("#"), "/");
        assert_eq!(normalize_path("#/workspace"), "/workspace");
        assert_eq!(normalize_path("/login"), "/login");
    }

    #[tokio::test]
    async fn test_signed_out_root_lands_on_login() {
        let router = router();

        let result = router.navigate("").await;

        assert_eq!(result, RouteResolution::Rendered(LOGIN.to_string()));
        assert_eq!(router.current_path(), LOGIN);
        assert!(router.mount().contains_text("login page"));
    }

    #[tokio::test]
    async fn test_unknown_path_goes_to_dashboard() {
        let router = router();
        router.store().set_user(Some(user()));

        let result = router.navigate("/nope").await;

        assert_eq!(result, RouteResolution::Rendered(DASHBOARD.to_string()));
        assert!(router.mount().contains_text("dashboard page"));
    }

    #[tokio::test]
    async fn test_login_while_signed_in_redirects() {
        let router = router();
        router.store().set_user(Some(user()));

        assert_eq!(
            router.navigate(LOGIN).await,
            RouteResolution::Rendered(DASHBOARD.to_string())
        );
        assert_eq!(
            router.navigate(SIGNUP).await,
            RouteResolution::Rendered(DASHBOARD.to_string())
        );
    }

    #[tokio::test]
    async fn test_workspace_requires_tenant() {
        let router = router();
        router.store().set_user(Some(user()));

        assert_eq!(
            router.navigate(WORKSPACE).await,
            RouteResolution::Rendered(DASHBOARD.to_string())
        );

        router.store().set_active_tenant_id("t-1");
        assert_eq!(
            router.navigate(WORKSPACE).await,
            RouteResolution::Rendered(WORKSPACE.to_string())
        );
        assert!(router.mount().contains_text("workspace page"));
    }

    #[tokio::test]
    async fn test_workspace_signed_out_goes_to_login() {
        let storage = Arc::new(MemoryStorage::with_items([(ACTIVE_TENANT_ID_KEY, "t-1")]));
        let router = router_with(storage);

        assert_eq!(
            router.navigate(WORKSPACE).await,
            RouteResolution::Rendered(LOGIN.to_string())
        );
    }

    #[tokio::test]
    async fn test_redirect_loop_is_bounded() {
        let router = router();
        router.add_route("/a", Arc::new(RedirectPage::new("/b")), RouteOptions::public());
        router.add_route("/b", Arc::new(RedirectPage::new("/a")), RouteOptions::public());

        let result = router.navigate("/a").await;

        assert!(matches!(result, RouteResolution::RedirectLoop(_)));
        assert!(!router.is_handling());
    }

    #[tokio::test]
    async fn test_unauthorized_signs_out() {
        let storage = Arc::new(MemoryStorage::with_items([(ACCESS_TOKEN_KEY, "stale")]));
        let router = router_with(Arc::clone(&storage));
        router.add_route(
            "/expired",
            Arc::new(FailingPage(PageError::Unauthorized)),
            RouteOptions::auth(),
        );
        router.store().set_user(Some(user()));
        router.store().set_active_tenant_id("t-1");

        let result = router.navigate("/expired").await;

        assert_eq!(result, RouteResolution::Rendered(LOGIN.to_string()));
        assert_eq!(storage.get_item(ACCESS_TOKEN_KEY), None);
        assert!(!router.store().is_authenticated());
        assert_eq!(router.store().active_tenant_id(), None);
    }

    #[tokio::test]
    async fn test_page_failure_shows_alert() {
        let router = router();
        router.add_route(
            "/broken",
            Arc::new(FailingPage(PageError::Failed("boom".into()))),
            RouteOptions::public(),
        );

        let result = router.navigate("/broken").await;

        assert_eq!(result, RouteResolution::Failed("boom".into()));
        assert!(router.mount().contains_text("boom"));
    }

    #[tokio::test]
    async fn test_newer_navigation_supersedes_slow_render() {
        let router = router();
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        router.add_route(
            "/slow",
            Arc::new(SlowPage {
                started: Arc::clone(&started),
                release: Arc::clone(&release),
            }),
            RouteOptions::public(),
        );

        let slow_router = router.clone();
        let slow = tokio::spawn(async move { slow_router.navigate("/slow").await });
        started.notified().await;
        assert!(router.is_handling());

        let fast = router.navigate(LOGIN).await;
        release.notify_one();
        let slow = slow.await.unwrap();

        assert_eq!(fast, RouteResolution::Rendered(LOGIN.to_string()));
        assert_eq!(slow, RouteResolution::Superseded);
        assert!(router.mount().contains_text("login page"));
        assert!(!router.mount().contains_text("slow page"));
        assert!(!router.is_handling());
    }

    #[tokio::test]
    async fn test_same_path_rerenders() {
        let router = router();
        router.navigate(LOGIN).await;
        let first = router.mount().generation();

        router.navigate(LOGIN).await;

        assert_eq!(router.mount().generation(), first + 1);
    }
}

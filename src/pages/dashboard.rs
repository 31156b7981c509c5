//! Workspace list
//!
//! Lists the tenants of the signed-in user and is the entry point for
//! creating, opening and signing out.

use async_trait::async_trait;

use super::{settle, PageContext};
use crate::api::services::{me, tenants};
use crate::router::{Page, PageResult, RenderContext, RenderOutcome, Router, LOGIN, WORKSPACE};
use crate::storage::ACCESS_TOKEN_KEY;
use crate::view::{components, Block};

const TENANTS_SECTION: &str = "tenants";
const ERROR_SECTION: &str = "dashboard-error";

pub struct DashboardPage {
    ctx: PageContext,
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    /// Create a workspace and open it
    pub async fn create_workspace(&self, router: &Router, name: &str) -> PageResult<()> {
        let handle = router.current_handle();
        let name = name.trim();
        if name.is_empty() {
            handle.replace_section(
                ERROR_SECTION,
                vec![components::error_alert("Workspace name cannot be empty")],
            );
            return Ok(());
        }

        let created = match settle(tenants::create(&self.ctx.api, name).await)? {
            Ok(created) => created,
            Err(message) => {
                handle.replace_section(ERROR_SECTION, vec![components::error_alert(message)]);
                return Ok(());
            }
        };

        let Some(tenant_id) = created.and_then(|c| c.tenant_id) else {
            handle.replace_section(
                ERROR_SECTION,
                vec![components::error_alert("Invalid workspace response")],
            );
            return Ok(());
        };

        tracing::info!(tenant_id = %tenant_id, name = %name, "Workspace created");
        self.ctx.store.set_active_tenant_id(&tenant_id);
        router.navigate(WORKSPACE).await;
        Ok(())
    }

    /// Select a workspace and open it
    pub async fn open_workspace(&self, router: &Router, tenant_id: &str) -> PageResult<()> {
        self.ctx.store.set_active_tenant_id(tenant_id);
        router.navigate(WORKSPACE).await;
        Ok(())
    }

    /// End the session everywhere and return to sign-in
    pub async fn sign_out(&self, router: &Router) -> PageResult<()> {
        if let Err(e) = self.ctx.auth.sign_out().await {
            tracing::warn!(error = %e, "Auth provider sign out failed");
        }
        self.ctx.store.clear();
        if let Err(e) = self.ctx.storage.remove_item(ACCESS_TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to remove access token");
        }

        tracing::info!("Signed out");
        router.navigate(LOGIN).await;
        Ok(())
    }
}

#[async_trait]
impl Page for DashboardPage {
    async fn render(&self, ctx: RenderContext) -> PageResult<RenderOutcome> {
        ctx.mount
            .replace(vec![Block::Muted("Loading workspaces...".into())]);

        let listed = match settle(me::list_my_tenants(&self.ctx.api).await)? {
            Ok(listed) => listed.unwrap_or_default(),
            Err(message) => {
                ctx.mount.replace(vec![components::error_card(message)]);
                return Ok(RenderOutcome::Rendered);
            }
        };

        let cards = if listed.tenants.is_empty() {
            vec![Block::Muted("No workspaces yet".into())]
        } else {
            listed.tenants.iter().map(components::tenant_card).collect()
        };

        ctx.mount.replace(vec![
            components::header("Workspaces", &["new-workspace <name>", "logout"]),
            components::section(ERROR_SECTION, Vec::new()),
            Block::Heading("Your workspaces".into()),
            Block::Muted("Select a workspace to get started, or create a new one.".into()),
            components::section(TENANTS_SECTION, cards),
            components::button("Open", "open <workspace id>"),
        ]);
        Ok(RenderOutcome::Rendered)
    }
}

//! Workspace page
//!
//! Shows the selected tenant and its notes. After a restart only the
//! tenant id is known, so the tenant itself is fetched and cached in the
//! store on first render.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::notes::{open_tenant_id, NotesSection, FORM_SECTION, NOTES_SECTION};
use super::{settle, PageContext};
use crate::api::services::tenants;
use crate::api::Tenant;
use crate::router::{Page, PageResult, RenderContext, RenderOutcome, Router, DASHBOARD};
use crate::view::{components, Block};

const ERROR_SECTION: &str = "workspace-error";

const ACTIONS: [&str; 6] = [
    "note <content>",
    "edit <id> <content>",
    "delete <id>",
    "refresh",
    "leave",
    "back",
];

pub struct WorkspacePage {
    ctx: PageContext,
    notes: NotesSection,
}

impl WorkspacePage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            notes: NotesSection::new(ctx.clone()),
            ctx,
        }
    }

    pub fn notes(&self) -> &NotesSection {
        &self.notes
    }

    /// Return to the workspace list
    pub async fn back(&self, router: &Router) -> PageResult<()> {
        router.navigate(DASHBOARD).await;
        Ok(())
    }

    /// Leave the open workspace and return to the list
    pub async fn leave(&self, router: &Router) -> PageResult<()> {
        let tenant_id = open_tenant_id(router, &self.ctx.store)?;

        match settle(tenants::leave(&self.ctx.api, &tenant_id).await)? {
            Ok(_) => {
                tracing::info!(tenant_id = %tenant_id, "Left workspace");
                self.ctx.store.set_active_tenant(None);
                router.navigate(DASHBOARD).await;
            }
            Err(message) => {
                router
                    .current_handle()
                    .replace_section(ERROR_SECTION, vec![components::error_alert(message)]);
            }
        }
        Ok(())
    }

    /// Cached tenant for `tenant_id`, fetched when the store lacks it
    ///
    /// The fetched tenant is only cached while `token` is live.
    async fn resolve_tenant(
        &self,
        tenant_id: &str,
        token: &CancellationToken,
    ) -> PageResult<Result<Option<Tenant>, String>> {
        if let Some(tenant) = self.ctx.store.active_tenant().filter(|t| t.id == tenant_id) {
            return Ok(Ok(Some(tenant)));
        }

        let fetched = settle(tenants::get(&self.ctx.api, tenant_id).await)?;
        if token.is_cancelled() {
            tracing::debug!(tenant_id = %tenant_id, "Tenant fetch superseded");
            return Ok(fetched);
        }
        if let Ok(Some(tenant)) = &fetched {
            tracing::debug!(tenant_id = %tenant.id, "Cached active tenant");
            self.ctx.store.set_active_tenant(Some(tenant.clone()));
        }
        Ok(fetched)
    }
}

#[async_trait]
impl Page for WorkspacePage {
    async fn render(&self, ctx: RenderContext) -> PageResult<RenderOutcome> {
        let Some(tenant_id) = self.ctx.store.active_tenant_id() else {
            return Ok(RenderOutcome::Redirect(DASHBOARD.to_string()));
        };

        let (tenant, error) = match self.resolve_tenant(&tenant_id, &ctx.token).await? {
            Ok(tenant) => (tenant, None),
            Err(message) => (None, Some(message)),
        };
        let name = tenant
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        ctx.mount.replace(vec![
            components::header(name.clone(), &ACTIONS),
            Block::Text(format!("Current tenant: {}", name)),
            Block::Muted(format!("Workspace for tenant: {}", tenant_id)),
            components::section(
                ERROR_SECTION,
                error.map(components::error_alert).into_iter().collect(),
            ),
            Block::Heading("Notes".into()),
            components::section(FORM_SECTION, Vec::new()),
            components::section(NOTES_SECTION, Vec::new()),
        ]);
        if ctx.token.is_cancelled() {
            return Ok(RenderOutcome::Rendered);
        }

        self.notes.load(&ctx.mount, &tenant_id).await?;
        Ok(RenderOutcome::Rendered)
    }
}

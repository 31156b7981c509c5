//! Sign-in page

use async_trait::async_trait;

use super::{auth_message, PageContext};
use crate::router::{Page, PageError, PageResult, RenderContext, RenderOutcome, Router, DASHBOARD};
use crate::storage::ACCESS_TOKEN_KEY;
use crate::view::{components, Block, FieldKind};

const ERROR_SECTION: &str = "login-error";

pub struct LoginPage {
    ctx: PageContext,
}

impl LoginPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    /// Sign in and open the dashboard
    pub async fn submit(&self, router: &Router, email: &str, password: &str) -> PageResult<()> {
        let handle = router.current_handle();
        handle.replace_section(ERROR_SECTION, Vec::new());

        let session = match self.ctx.auth.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(e) => {
                tracing::info!(provider = self.ctx.auth.name(), error = %e, "Sign in rejected");
                handle.replace_section(
                    ERROR_SECTION,
                    vec![components::error_alert(auth_message(&e, "Login failed"))],
                );
                return Ok(());
            }
        };

        self.ctx
            .storage
            .set_item(ACCESS_TOKEN_KEY, &session.access_token)
            .map_err(|e| PageError::Failed(format!("Could not save session: {}", e)))?;

        tracing::debug!(user_id = %session.user.id, "Session stored");
        self.ctx.store.set_user(Some(session.user));
        router.navigate(DASHBOARD).await;
        Ok(())
    }
}

#[async_trait]
impl Page for LoginPage {
    async fn render(&self, ctx: RenderContext) -> PageResult<RenderOutcome> {
        ctx.mount.replace(vec![
            components::header("Sign In", &[]),
            components::input("Email", FieldKind::Email, "your_email@example.com"),
            components::input("Password", FieldKind::Password, "••••••••"),
            components::button("Sign In", "login <email> <password>"),
            components::section(ERROR_SECTION, Vec::new()),
            Block::Muted("Don't have an account?".into()),
            components::button("Create one", "go /signup"),
        ]);
        Ok(RenderOutcome::Rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{harness, TOKEN};
    use crate::router::{DASHBOARD, LOGIN};
    use crate::storage::{KeyValueStorage, ACCESS_TOKEN_KEY};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_login_success_opens_dashboard() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/tenants"))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"tenants": []},
                "error": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        h.app.router.navigate(LOGIN).await;

        h.app
            .login
            .submit(&h.app.router, "ada@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(h.storage.get_item(ACCESS_TOKEN_KEY).as_deref(), Some(TOKEN));
        assert!(h.app.router.store().is_authenticated());
        assert_eq!(h.app.router.current_path(), DASHBOARD);
        assert!(h.app.router.mount().contains_text("No workspaces yet"));
    }

    #[tokio::test]
    async fn test_login_failure_shows_message() {
        let server = MockServer::start().await;
        let h = harness(&server);
        h.app.router.navigate(LOGIN).await;

        h.app
            .login
            .submit(&h.app.router, "ada@example.com", "wrong")
            .await
            .unwrap();

        assert_eq!(h.app.router.current_path(), LOGIN);
        assert!(h.app.router.mount().contains_text("Invalid login credentials"));
        assert_eq!(h.storage.get_item(ACCESS_TOKEN_KEY), None);
    }
}

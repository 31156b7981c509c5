//! Account creation page

use async_trait::async_trait;

use super::{auth_message, PageContext};
use crate::router::{Page, PageResult, RenderContext, RenderOutcome, Router, LOGIN};
use crate::view::{components, Block, FieldKind};

const ERROR_SECTION: &str = "signup-error";

/// Shortest password accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

pub struct SignupPage {
    ctx: PageContext,
}

impl SignupPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    /// Check the form before contacting the provider
    pub fn validate(password: &str, confirm: &str) -> Result<(), &'static str> {
        if password != confirm {
            return Err("Passwords do not match");
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters");
        }
        Ok(())
    }

    /// Create the account and return to the sign-in page
    pub async fn submit(
        &self,
        router: &Router,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> PageResult<()> {
        let handle = router.current_handle();
        handle.replace_section(ERROR_SECTION, Vec::new());

        if let Err(message) = Self::validate(password, confirm) {
            handle.replace_section(ERROR_SECTION, vec![components::error_alert(message)]);
            return Ok(());
        }

        match self.ctx.auth.sign_up(email, password).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Account created");
                router.navigate(LOGIN).await;
            }
            Err(e) => {
                tracing::info!(provider = self.ctx.auth.name(), error = %e, "Sign up rejected");
                handle.replace_section(
                    ERROR_SECTION,
                    vec![components::error_alert(auth_message(&e, "Signup failed"))],
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Page for SignupPage {
    async fn render(&self, ctx: RenderContext) -> PageResult<RenderOutcome> {
        ctx.mount.replace(vec![
            components::header("Create your account", &[]),
            Block::Muted("Join our workspace community today".into()),
            components::section(ERROR_SECTION, Vec::new()),
            components::input("Email", FieldKind::Email, "you@example.com"),
            components::input("Password", FieldKind::Password, "Create a strong password"),
            components::input("Confirm Password", FieldKind::Password, "Confirm your password"),
            components::button("Create account", "signup <email> <password> <confirm>"),
            Block::Muted("Already have an account?".into()),
            components::button("Sign in", "go /login"),
        ]);
        Ok(RenderOutcome::Rendered)
    }
}

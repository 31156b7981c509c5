//! # Tenant Notes
//!
//! Client for a multi-tenant notes service: users sign in, pick a
//! workspace (tenant) and manage the notes inside it.
//!
//! ## Modules
//!
//! - [`api`]: HTTP client, response envelope and typed endpoint calls
//! - [`auth`]: Pluggable auth provider
//! - [`storage`]: Persisted key-value client storage
//! - [`state`]: Session store with change events
//! - [`router`]: Guarded path routing with cancellable renders
//! - [`view`]: Screen model pages render into
//! - [`pages`]: Login, signup, dashboard and workspace screens
//! - [`shell`]: Line-oriented terminal front end
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tenant_notes::{App, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::from_config(&Config::default())?;
//!
//!     // Restores a stored session and lands on the dashboard or login
//!     app.start("/").await;
//!     println!("{}", app.router.mount().render_text());
//!
//!     app.login.submit(&app.router, "me@example.com", "change-me").await?;
//!     println!("{}", app.router.mount().render_text());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod pages;
pub mod router;
pub mod shell;
pub mod state;
pub mod storage;
pub mod view;

// Re-export top-level types for convenience
pub use api::{
    ApiClient, ApiClientConfig, ApiOutcome, ApiResponse, ErrorPayload, Note, Tenant,
    TenantSummary,
};
pub use app::{App, AppError};
pub use auth::{AuthError, AuthProvider, MemoryAuthProvider, Session, User};
pub use config::{Config, ConfigError};
pub use router::{PageError, RouteOptions, RouteResolution, Router};
pub use state::{AppState, Store, StoreEvent, StoreEventKind};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use view::{Block, Mount, MountHandle};

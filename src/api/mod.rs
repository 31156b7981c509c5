//! Notes Backend API
//!
//! Typed client for the multi-tenant notes REST backend.
//!
//! # Endpoints
//!
//! ## Me
//! - `GET /me/tenants` - Tenants the signed-in user belongs to
//!
//! ## Tenants
//! - `GET /tenants` - List tenants
//! - `GET /tenants/:id` - Get a tenant
//! - `POST /tenants` - Create a tenant
//! - `POST /tenants/:id/leave` - Leave a tenant
//!
//! ## Notes
//! - `GET /tenants/:id/notes` - List a tenant's notes
//! - `POST /tenants/:id/notes` - Create a note
//! - `GET /notes/:id` - Get a note
//! - `PATCH /notes/:id` - Update a note
//! - `DELETE /notes/:id` - Soft-delete a note
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tenant_notes::api::{services, ApiClient, ApiClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = ApiClient::new(ApiClientConfig::default(), Arc::new(|| Some("token".to_string())))?;
//!
//! match services::me::list_my_tenants(&api).await.authorized() {
//!     Ok(response) => println!("{:?}", response.data),
//!     Err(_) => println!("session expired"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod services;

pub use client::{
    ApiClient, ApiClientConfig, RequestBody, StorageTokenProvider, TokenProvider,
    DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT,
};
pub use dto::{
    CreateTenantResponse, DeleteNoteResponse, LeaveTenantResponse, ListTenantNotesResponse,
    ListTenantsResponse, Note, NoteResponse, Tenant, TenantRole, TenantSummary,
};
pub use envelope::{
    is_known_error_code, resolve_error_message, ApiOutcome, ApiResponse, DbErrorCode,
    ErrorPayload, Unauthorized, DEFAULT_ERROR_MESSAGE, INVALID_RESPONSE, NETWORK_FAILURE,
    UNKNOWN_ERROR,
};
pub use error::{ClientError, ClientResult};

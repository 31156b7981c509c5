//! Tenant endpoints

use super::segment;
use crate::api::client::ApiClient;
use crate::api::dto::{
    CreateTenantRequest, CreateTenantResponse, LeaveTenantResponse, ListTenantsResponse, Tenant,
};
use crate::api::envelope::ApiOutcome;

/// `GET /tenants`
pub async fn list(api: &ApiClient) -> ApiOutcome<ListTenantsResponse> {
    api.get("/tenants").await
}

/// Fetch a single tenant
///
/// `GET /tenants/:id`
pub async fn get(api: &ApiClient, tenant_id: &str) -> ApiOutcome<Tenant> {
    api.get(&format!("/tenants/{}", segment(tenant_id))).await
}

/// Create a tenant; the caller becomes its owner
///
/// `POST /tenants`
pub async fn create(api: &ApiClient, name: &str) -> ApiOutcome<CreateTenantResponse> {
    let body = CreateTenantRequest {
        name: name.to_string(),
    };
    api.post("/tenants", &body).await
}

/// Leave a tenant
///
/// `POST /tenants/:id/leave`
pub async fn leave(api: &ApiClient, tenant_id: &str) -> ApiOutcome<LeaveTenantResponse> {
    api.post_empty(&format!("/tenants/{}/leave", segment(tenant_id)))
        .await
}

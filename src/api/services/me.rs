//! Endpoints scoped to the signed-in user

use crate::api::client::ApiClient;
use crate::api::dto::ListTenantsResponse;
use crate::api::envelope::ApiOutcome;

/// List tenants the authenticated user is a member of
///
/// `GET /me/tenants`
pub async fn list_my_tenants(api: &ApiClient) -> ApiOutcome<ListTenantsResponse> {
    api.get("/me/tenants").await
}

//! Note endpoints

use super::segment;
use crate::api::client::ApiClient;
use crate::api::dto::{
    DeleteNoteResponse, ListTenantNotesResponse, Note, NoteContentRequest, NoteResponse,
};
use crate::api::envelope::ApiOutcome;

/// Notes of a tenant, newest first, soft-deleted notes excluded
///
/// `GET /tenants/:id/notes`
pub async fn list_by_tenant(api: &ApiClient, tenant_id: &str) -> ApiOutcome<ListTenantNotesResponse> {
    api.get(&format!("/tenants/{}/notes", segment(tenant_id)))
        .await
}

/// `POST /tenants/:id/notes`
pub async fn create(api: &ApiClient, tenant_id: &str, content: &str) -> ApiOutcome<NoteResponse> {
    let body = NoteContentRequest {
        content: content.to_string(),
    };
    api.post(&format!("/tenants/{}/notes", segment(tenant_id)), &body)
        .await
}

/// `GET /notes/:id`
pub async fn get(api: &ApiClient, note_id: &str) -> ApiOutcome<Note> {
    api.get(&format!("/notes/{}", segment(note_id))).await
}

/// Replace a note's content (owner or write-share only)
///
/// `PATCH /notes/:id`
pub async fn update(api: &ApiClient, note_id: &str, content: &str) -> ApiOutcome<NoteResponse> {
    let body = NoteContentRequest {
        content: content.to_string(),
    };
    api.patch(&format!("/notes/{}", segment(note_id)), &body)
        .await
}

/// Soft-delete a note (owner only)
///
/// `DELETE /notes/:id`
pub async fn delete(api: &ApiClient, note_id: &str) -> ApiOutcome<DeleteNoteResponse> {
    api.delete(&format!("/notes/{}", segment(note_id))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ApiClientConfig;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        let config = ApiClientConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        ApiClient::new(config, Arc::new(|| Some("tok".to_string()))).unwrap()
    }

    #[tokio::test]
    async fn test_list_by_tenant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/t-1/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "notes": [{
                        "id": "n-1",
                        "tenant_id": "t-1",
                        "owner_id": "u-1",
                        "content": "First",
                        "created_at": "2024-01-01T00:00:00Z",
                        "updated_at": "2024-01-01T00:00:00Z"
                    }],
                    "total": 1
                },
                "error": null
            })))
            .mount(&server)
            .await;

        let list = list_by_tenant(&client(&server), "t-1")
            .await
            .authorized()
            .unwrap()
            .data
            .unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.notes[0].content, "First");
    }

    #[tokio::test]
    async fn test_update_sends_patch_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/notes/n-1"))
            .and(body_json(json!({"content": "Edited"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "data": null,
                "error": {"code": "DB0402", "message": "Only the owner can edit this note"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = update(&client(&server), "n-1", "Edited")
            .await
            .authorized()
            .unwrap();
        assert_eq!(response.error.unwrap().code, "DB0402");
    }

    #[tokio::test]
    async fn test_delete_note() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/notes/n-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"note_id": "n-1", "result": "deleted"},
                "error": null
            })))
            .mount(&server)
            .await;

        let response = delete(&client(&server), "n-1").await.authorized().unwrap();
        assert_eq!(response.data.unwrap().result, "deleted");
    }

    #[tokio::test]
    async fn test_get_note_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes/n-404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "data": null,
                "error": {"code": "DB0404", "message": "Note not found"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = get(&client(&server), "n-404").await.authorized().unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.unwrap().message, "Note not found");
    }
}

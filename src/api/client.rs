//! HTTP API Client
//!
//! The fetch wrapper every service goes through. It owns the base URL, the
//! bearer token lookup and the request timeout, and turns every possible
//! transport result into an [`ApiOutcome`]:
//!
//! | Server / transport result        | Outcome                                  |
//! |----------------------------------|------------------------------------------|
//! | timeout, connect error, bad JSON | `Completed` + `NETWORK_FAILURE`          |
//! | HTTP 401                         | `Unauthorized`                           |
//! | HTTP 204                         | `Completed` + success, no data           |
//! | non-JSON content type            | `Completed` + `INVALID_RESPONSE`         |
//! | JSON body                        | `Completed` + the (normalized) envelope  |

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::envelope::{ApiOutcome, ApiResponse, INVALID_RESPONSE, NETWORK_FAILURE};
use super::error::{ClientError, ClientResult};
use crate::storage::{KeyValueStorage, ACCESS_TOKEN_KEY};

/// Default backend base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Default client-side request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const JSON_MIME: &str = "application/json";

/// Supplies the bearer token attached to each request
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn access_token(&self) -> Option<String> {
        self()
    }
}

/// Reads the token from persisted client storage on every request
pub struct StorageTokenProvider {
    storage: Arc<dyn KeyValueStorage>,
}

impl StorageTokenProvider {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }
}

impl TokenProvider for StorageTokenProvider {
    fn access_token(&self) -> Option<String> {
        self.storage
            .get_item(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL prepended to every endpoint (e.g. "http://localhost:8000")
    pub base_url: String,
    /// Whole-request timeout, body included
    pub request_timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Request payload
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Multipart form; the encoder sets its own `Content-Type` with boundary
    Multipart(reqwest::multipart::Form),
}

/// Backend REST client
pub struct ApiClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    token_provider: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// Create a new client with the given configuration and token source
    pub fn new(config: ApiClientConfig, token_provider: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(config.base_url));
        }

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url,
            request_timeout: config.request_timeout,
            token_provider,
        })
    }

    /// Normalized base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform a request and fold the result into an [`ApiOutcome`]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
    ) -> ApiOutcome<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(ACCEPT, JSON_MIME);

        builder = match body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, JSON_MIME),
            RequestBody::Json(value) => builder.header(CONTENT_TYPE, JSON_MIME).json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        if let Some(token) = self.token_provider.access_token() {
            builder = builder.bearer_auth(token);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return ApiOutcome::Completed(self.network_failure(&method, endpoint, &e)),
        };

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::info!(method = %method, endpoint, "Request rejected as unauthorized");
            return ApiOutcome::Unauthorized;
        }

        if status == StatusCode::NO_CONTENT {
            return ApiOutcome::Completed(ApiResponse::no_content());
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains(JSON_MIME))
            .unwrap_or(false);

        if !is_json {
            return ApiOutcome::Completed(ApiResponse::failure(
                INVALID_RESPONSE,
                format!("Unexpected response format (HTTP {})", status.as_u16()),
            ));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return ApiOutcome::Completed(self.network_failure(&method, endpoint, &e)),
        };

        let envelope = match serde_json::from_slice::<ApiResponse<T>>(&bytes) {
            Ok(envelope) => envelope.normalize(),
            Err(e) => {
                tracing::debug!(method = %method, endpoint, error = %e, "Failed to decode response envelope");
                return ApiOutcome::Completed(ApiResponse::failure(NETWORK_FAILURE, e.to_string()));
            }
        };

        if let Some(error) = envelope.error.as_ref() {
            tracing::debug!(
                method = %method,
                endpoint,
                status = status.as_u16(),
                error_code = %error.code,
                error_message = %error.message,
                "API error"
            );
        }

        ApiOutcome::Completed(envelope)
    }

    fn network_failure<T>(&self, method: &Method, endpoint: &str, error: &reqwest::Error) -> ApiResponse<T> {
        let message = if error.is_timeout() {
            format!(
                "Request timed out after {}s",
                self.request_timeout.as_secs_f64()
            )
        } else {
            error.to_string()
        };

        tracing::debug!(method = %method, endpoint, error = %error, "Network failure");
        ApiResponse::failure(NETWORK_FAILURE, message)
    }

    fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, String> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| format!("Request build error: {}", e))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiOutcome<T> {
        self.request(Method::GET, path, RequestBody::Empty).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiOutcome<T> {
        match Self::json_body(body) {
            Ok(body) => self.request(Method::POST, path, body).await,
            Err(message) => ApiOutcome::Completed(ApiResponse::failure(NETWORK_FAILURE, message)),
        }
    }

    /// POST without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiOutcome<T> {
        self.request(Method::POST, path, RequestBody::Empty).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ApiOutcome<T> {
        self.request(Method::POST, path, RequestBody::Multipart(form))
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiOutcome<T> {
        match Self::json_body(body) {
            Ok(body) => self.request(Method::PATCH, path, body).await,
            Err(message) => ApiOutcome::Completed(ApiResponse::failure(NETWORK_FAILURE, message)),
        }
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiOutcome<T> {
        self.request(Method::DELETE, path, RequestBody::Empty).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        let token = token.map(str::to_string);
        let config = ApiClientConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_millis(500),
        };
        ApiClient::new(config, Arc::new(move || token.clone())).unwrap()
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let config = ApiClientConfig {
            base_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        let result = ApiClient::new(config, Arc::new(|| None));
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ApiClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(config, Arc::new(|| None)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_storage_token_provider() {
        let storage: Arc<dyn KeyValueStorage> =
            Arc::new(MemoryStorage::with_items([(ACCESS_TOKEN_KEY, "abc")]));
        let provider = StorageTokenProvider::new(Arc::clone(&storage));
        assert_eq!(provider.access_token().as_deref(), Some("abc"));

        storage.remove_item(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(provider.access_token(), None);
    }

    #[tokio::test]
    async fn test_json_envelope_returned_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/tenants"))
            .and(header("authorization", "Bearer tok-1"))
            .and(header("accept", "application/json"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"tenants": []},
                "error": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("tok-1"));
        let response = client.get::<Value>("/me/tenants").await.authorized().unwrap();

        assert!(response.success);
        assert_eq!(response.data, Some(json!({"tenants": []})));
        assert_eq!(response.error, None);
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants"))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"success": true, "data": [], "error": null}))
                }
            })
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let response = client.get::<Value>("/tenants").await.authorized().unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_no_content_has_no_data_and_no_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/notes/n-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("tok"));
        let response = client.delete::<Value>("/notes/n-1").await.authorized().unwrap();

        assert!(response.success);
        assert_eq!(response.data, None);
        assert_eq!(response.error, None);
    }

    #[tokio::test]
    async fn test_html_response_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants"))
            .respond_with(
                ResponseTemplate::new(502).set_body_raw("<html>Bad gateway</html>", "text/html"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let response = client.get::<Value>("/tenants").await.authorized().unwrap();

        assert!(!response.success);
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_RESPONSE);
        assert_eq!(error.message, "Unexpected response format (HTTP 502)");
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/tenants"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": null, "error": null}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let response = client.get::<Value>("/me/tenants").await.authorized().unwrap();

        assert!(!response.success);
        assert_eq!(response.error.unwrap().code, NETWORK_FAILURE);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_failure() {
        let config = ApiClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_millis(500),
        };
        let client = ApiClient::new(config, Arc::new(|| None)).unwrap();
        let response = client.get::<Value>("/tenants").await.authorized().unwrap();

        assert_eq!(response.error.unwrap().code, NETWORK_FAILURE);
    }

    #[tokio::test]
    async fn test_unauthorized_is_explicit_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/tenants"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "data": null,
                "error": {"code": "DB0001", "message": "Unauthenticated"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("expired"));
        let outcome = client.get::<Value>("/me/tenants").await;
        assert!(outcome.is_unauthorized());
    }

    #[tokio::test]
    async fn test_backend_error_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenants"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "data": null,
                "error": {"code": "DB0104", "message": "Invalid tenant name"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("tok"));
        let response = client
            .post::<Value, _>("/tenants", &json!({"name": ""}))
            .await
            .authorized()
            .unwrap();

        assert!(!response.success);
        let error = response.error.unwrap();
        assert_eq!(error.code, "DB0104");
        assert_eq!(error.message, "Invalid tenant name");
    }

    #[tokio::test]
    async fn test_failed_envelope_without_error_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"success": false})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let response = client.get::<Value>("/tenants").await.authorized().unwrap();
        assert!(response.has_error());
    }

    #[tokio::test]
    async fn test_malformed_json_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let response = client.get::<Value>("/tenants").await.authorized().unwrap();
        assert_eq!(response.error.unwrap().code, NETWORK_FAILURE);
    }

    #[tokio::test]
    async fn test_multipart_sets_own_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header_exists("content-type"))
            .respond_with(|req: &Request| {
                let ct = req
                    .headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if ct.starts_with("multipart/form-data") {
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"success": true, "data": "ok", "error": null}))
                } else {
                    ResponseTemplate::new(415)
                }
            })
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let form = reqwest::multipart::Form::new().text("field", "value");
        let response = client
            .post_multipart::<String>("/upload", form)
            .await
            .authorized()
            .unwrap();
        assert_eq!(response.data.as_deref(), Some("ok"));
    }
}

//! Mock remote store for testing the REST client
//!
//! Serves the PostgREST endpoints the manager calls, so tests can run
//! without a hosted back-end.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use super::test_data::tokens;

/// Mock store server that simulates PostgREST responses
pub struct MockStoreServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockStoreServer {
    /// Create a new mock store server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Mock a delete-all that reports `count` removed rows
    pub async fn mock_delete_all(&self, table: &str, count: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/rest/v1/{}", table)))
            .and(query_param("id", "neq.00000000-0000-0000-0000-000000000000"))
            .and(header("apikey", tokens::ACCESS_KEY))
            .and(header(
                "authorization",
                format!("Bearer {}", tokens::ACCESS_KEY).as_str(),
            ))
            .respond_with(
                ResponseTemplate::new(204).insert_header("content-range", format!("*/{}", count)),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a procedure returning `body`
    pub async fn mock_procedure(&self, name: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/rest/v1/rpc/{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a procedure failing with a PostgREST error body
    pub async fn mock_procedure_error(&self, name: &str, status: u16, code: &str, message: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/rest/v1/rpc/{}", name)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "code": code,
                "message": message,
                "details": null,
                "hint": null
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock the latest cleanup log read
    pub async fn mock_latest_log(&self, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/cleanup_log"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    /// Mock a missing table for any request to `table`
    pub async fn mock_missing_table(&self, table: &str) {
        Mock::given(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "PGRST205",
                "message": format!("Could not find the table 'public.{}' in the schema cache", table)
            })))
            .mount(&self.server)
            .await;
    }

    /// Accept cleanup log inserts
    pub async fn mock_log_insert(&self) {
        Mock::given(method("POST"))
            .and(path("/rest/v1/cleanup_log"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.server)
            .await;
    }

    /// Mock an exact row count
    pub async fn mock_count(&self, table: &str, count: u64) {
        Mock::given(method("HEAD"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-range", format!("0-{}/{}", count.saturating_sub(1), count)),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock the maintenance status view
    pub async fn mock_maintenance_status(&self, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/maintenance_status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    /// Bodies of all requests received on `path`
    pub async fn request_bodies(&self, request_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == request_path)
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Number of requests received on `path`
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }
}

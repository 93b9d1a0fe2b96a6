//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all catalog-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::REQUEST_TIMEOUT_SECS;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client for the catalog endpoints
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(&self.base_url)
            .send()
            .await
            .expect("home request failed")
    }

    /// POST /v1/catalogs
    pub async fn create_catalog(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/v1/catalogs", self.base_url))
            .json(body)
            .send()
            .await
            .expect("create request failed")
    }

    /// GET /v1/catalogs
    pub async fn list_catalogs(&self) -> Response {
        self.client
            .get(format!("{}/v1/catalogs", self.base_url))
            .send()
            .await
            .expect("list request failed")
    }

    /// GET /v1/catalogs/{id}
    pub async fn get_catalog(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/catalogs/{}", self.base_url, id))
            .send()
            .await
            .expect("get request failed")
    }

    /// PATCH /v1/catalogs/{id}
    pub async fn update_catalog(&self, id: &str, body: &Value) -> Response {
        self.client
            .patch(format!("{}/v1/catalogs/{}", self.base_url, id))
            .json(body)
            .send()
            .await
            .expect("update request failed")
    }

    /// DELETE /v1/catalogs/{id}
    pub async fn delete_catalog(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/v1/catalogs/{}", self.base_url, id))
            .send()
            .await
            .expect("delete request failed")
    }

    /// DELETE /v1/catalogs with an ids body
    pub async fn delete_catalogs(&self, ids: &[&str]) -> Response {
        self.client
            .delete(format!("{}/v1/catalogs", self.base_url))
            .json(&json!({ "ids": ids }))
            .send()
            .await
            .expect("bulk delete request failed")
    }
}

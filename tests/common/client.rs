//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides one method per quotes endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    // ========================================================================
    // Quotes Endpoints
    // ========================================================================

    pub async fn get_random_quote(&self) -> Response {
        self.get("/api/quotes/random").await
    }

    /// Raw query values, so tests can send garbage
    pub async fn list_quotes(&self, page: Option<&str>, limit: Option<&str>) -> Response {
        let mut query = vec![];
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        self.client
            .get(self.url("/api/quotes"))
            .query(&query)
            .send()
            .await
            .expect("List quotes request failed")
    }

    pub async fn get_quotes_by_song(&self, song: &str) -> Response {
        let mut url = reqwest::Url::parse(&self.url("/api/quotes/song")).expect("Invalid URL");
        url.path_segments_mut()
            .expect("Base URL cannot have path segments")
            .push(song);
        self.client
            .get(url)
            .send()
            .await
            .expect("Quotes by song request failed")
    }

    pub async fn search_quotes(&self, q: Option<&str>) -> Response {
        let mut request = self.client.get(self.url("/api/quotes/search"));
        if let Some(q) = q {
            request = request.query(&[("q", q)]);
        }
        request.send().await.expect("Search request failed")
    }

    pub async fn get_stats(&self) -> Response {
        self.get("/api/quotes/stats").await
    }

    pub async fn add_quote(&self, body: &Value) -> Response {
        self.client
            .post(self.url("/api/quotes"))
            .json(body)
            .send()
            .await
            .expect("Add quote request failed")
    }

    pub async fn increment_popularity(&self, id: &str) -> Response {
        self.client
            .patch(self.url(&format!("/api/quotes/{}/popularity", id)))
            .send()
            .await
            .expect("Increment popularity request failed")
    }

    pub async fn delete_quote(&self, id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/api/quotes/{}", id)))
            .send()
            .await
            .expect("Delete quote request failed")
    }

    pub async fn fetch_quotes(&self) -> Response {
        self.client
            .post(self.url("/api/quotes/fetch"))
            .send()
            .await
            .expect("Fetch quotes request failed")
    }

    pub async fn get_status(&self) -> Response {
        self.get("/api/status").await
    }
}

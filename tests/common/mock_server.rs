//! Mock image host for fetch strategy tests.

use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Wrapper around wiremock MockServer with image-serving helpers
pub struct MockImageServer {
    pub server: MockServer,
}

impl MockImageServer {
    /// Start a new mock image server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Serve raw bytes with a content type
    pub async fn mock_body(&self, endpoint: &str, body: Vec<u8>, content_type: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body)
                    .insert_header("content-type", content_type),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve a PNG body
    pub async fn mock_png(&self, endpoint: &str, png: Vec<u8>) {
        self.mock_body(endpoint, png, "image/png").await;
    }

    /// Serve a JPEG body
    pub async fn mock_jpeg(&self, endpoint: &str, jpeg: Vec<u8>) {
        self.mock_body(endpoint, jpeg, "image/jpeg").await;
    }

    /// Serve a body after a delay
    pub async fn mock_delayed(&self, endpoint: &str, body: Vec<u8>, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body)
                    .insert_header("content-type", "image/png")
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Redirect one path to another on this server
    pub async fn mock_redirect(&self, from: &str, to: &str) {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", self.url_for(to).as_str()),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an endpoint that returns an error
    pub async fn mock_error(&self, endpoint: &str, status: u16, message: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(message))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for a path
    pub async fn hits(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == endpoint)
            .count()
    }
}

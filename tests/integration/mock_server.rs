//! Mock HTTP server setup for integration tests

use form_submit::{Form, HttpTransport, HttpTransportConfig};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Form whose transport resolves relative URLs against the mock server
    pub fn form(&self) -> Form {
        crate::support::init_tracing();
        let transport = HttpTransport::new(
            HttpTransportConfig::default().with_base_url(self.base_url.clone()),
        )
        .expect("transport");
        Form::with_transport(Arc::new(transport))
    }

    /// Mock a JSON response for the given method and path
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Mock a JSON request body match with a JSON response
    pub async fn mock_json_exchange(
        &mut self,
        method: &str,
        path: &str,
        request: serde_json::Value,
        status: usize,
        body: &str,
    ) -> Mock {
        self.server
            .mock(method, path)
            .match_header("content-type", "application/json")
            .match_header("x-requested-with", "XMLHttpRequest")
            .match_body(Matcher::Json(request))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

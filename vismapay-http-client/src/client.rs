//! HTTP client implementation.

use reqwest::Request;
use std::sync::Arc;
use tracing::debug;

use crate::{HttpClientConfig, HttpClientError, RequestBuilder, Response, Result};

/// JSON-over-HTTP client used as the gateway transport.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            // Signed bodies are never re-sent to another location.
            .redirect(reqwest::redirect::Policy::none());

        if config.gzip {
            builder = builder.gzip(true);
        }

        let inner = builder.build()?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    pub(crate) fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, url.into())
    }

    /// Execute a request once.
    pub(crate) async fn execute(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.inner.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                HttpClientError::Timeout(self.config.timeout)
            } else if e.is_connect() {
                HttpClientError::Connection(e.to_string())
            } else {
                HttpClientError::Http(e)
            }
        })?;

        let response = Response::from_reqwest(response).await?;
        debug!(
            method = %method,
            url = %url,
            status = %response.status(),
            bytes = response.bytes().len(),
            "HTTP exchange completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        assert!(client.config().gzip);
    }

    #[test]
    fn test_client_with_config() {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_secs(60))
            .base_url("https://api.example.com/")
            .build();

        let client = HttpClient::new(config).unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(60));
        assert_eq!(
            client.config().base_url.as_deref(),
            Some("https://api.example.com/")
        );
    }

    #[tokio::test]
    async fn test_post_json_against_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pbwapi/capture"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "order_number": "123" })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":0}"#))
            .expect(1)
            .mount(&server)
            .await;

        let config = HttpClientConfig::builder()
            .base_url(format!("{}/pbwapi/", server.uri()))
            .build();
        let client = HttpClient::new(config).unwrap();

        let response = client
            .post("capture")
            .json(&serde_json::json!({ "order_number": "123" }))
            .send()
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.into_bytes().as_ref(), br#"{"result":0}"#);
    }

    #[tokio::test]
    async fn test_default_headers_and_user_agent_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pbwapi/cancel"))
            .and(header("x-merchant-tag", "shop-1"))
            .and(header("user-agent", "vismapay-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":0}"#))
            .expect(1)
            .mount(&server)
            .await;

        let config = HttpClientConfig::builder()
            .base_url(format!("{}/pbwapi/", server.uri()))
            .default_header("X-Merchant-Tag", "shop-1")
            .user_agent("vismapay-test/1.0")
            .build();
        let client = HttpClient::new(config).unwrap();

        let response = client.post("cancel").send().await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let response = client
            .post(format!("{}/anything", server.uri()))
            .send()
            .await
            .unwrap();

        assert!(response.is_server_error());
        assert_eq!(response.bytes().as_ref(), b"oops");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = HttpClient::new(
            HttpClientConfig::builder()
                .connect_timeout(Duration::from_millis(200))
                .build(),
        )
        .unwrap();

        let err = client
            .post("http://127.0.0.1:1/never")
            .send()
            .await
            .unwrap_err();

        assert!(err.is_connection() || err.is_timeout() || matches!(err, HttpClientError::Http(_)));
    }
}

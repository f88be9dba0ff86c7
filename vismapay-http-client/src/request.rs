//! POST request builder.

use crate::{HttpClient, HttpClientError, Response, Result};
use http::{HeaderMap, HeaderValue};
use serde::Serialize;

/// POST request builder.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    url: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    body_error: Option<HttpClientError>,
}

impl<'a> RequestBuilder<'a> {
    /// Create a new request builder.
    pub(crate) fn new(client: &'a HttpClient, url: String) -> Self {
        Self {
            client,
            url,
            headers: HeaderMap::new(),
            body: None,
            body_error: None,
        }
    }

    /// Set the request body as JSON.
    ///
    /// A serialization failure is reported when the request is sent.
    pub fn json<T: Serialize>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(bytes) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.body = Some(bytes);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON body");
                self.body_error = Some(HttpClientError::Json(e.to_string()));
            }
        }
        self
    }

    /// Resolve the URL against the configured base URL, if any.
    fn build_url(&self) -> Result<url::Url> {
        match &self.client.config().base_url {
            Some(base) => {
                let base = url::Url::parse(base)
                    .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
                base.join(&self.url)
                    .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))
            }
            None => url::Url::parse(&self.url)
                .map_err(|e| HttpClientError::InvalidUrl(e.to_string())),
        }
    }

    /// Send the request.
    pub async fn send(self) -> Result<Response> {
        if let Some(err) = self.body_error {
            return Err(err);
        }

        let url = self.build_url()?;

        let mut request = self.client.inner().post(url);

        for (name, value) in &self.client.config().default_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        if let Some(body) = self.body {
            request = request.body(body);
        }

        let request = request
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;

        self.client.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpClientConfig;

    #[test]
    fn test_relative_path_joins_base_url() {
        let client = HttpClient::new(
            HttpClientConfig::builder()
                .base_url("https://www.vismapay.com/pbwapi/")
                .build(),
        )
        .unwrap();

        let url = client.post("auth_payment").build_url().unwrap();
        assert_eq!(url.as_str(), "https://www.vismapay.com/pbwapi/auth_payment");
    }

    #[test]
    fn test_absolute_url_without_base() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let url = client.post("http://localhost:8080/x").build_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/x");
    }

    #[test]
    fn test_relative_url_without_base_is_invalid() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let err = client.post("capture").build_url().unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_json_sets_content_type() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let builder = client.post("http://localhost/").json(&serde_json::json!({"a": 1}));
        assert_eq!(
            builder.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(builder.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
    }
}

//! Transport seam
//!
//! The client only needs "POST this JSON to this path, give me the body".
//! [`HttpClient`] is the production implementation; tests substitute their
//! own.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use vismapay_http_client::{HttpClient, Result};

/// Posts JSON bodies to paths under the API root
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `path` and return the raw response body.
    ///
    /// Only failures of the exchange itself are errors. Any response that
    /// arrives, whatever its status, yields its body.
    async fn post(&self, path: &str, body: &Value) -> Result<Bytes>;
}

#[async_trait]
impl Transport for HttpClient {
    async fn post(&self, path: &str, body: &Value) -> Result<Bytes> {
        let response = HttpClient::post(self, path).json(body).send().await?;
        Ok(response.into_bytes())
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn post(&self, path: &str, body: &Value) -> Result<Bytes> {
        (**self).post(path, body).await
    }
}

//! Buffered gateway response.

use crate::Result;
use bytes::Bytes;
use http::StatusCode;

/// Status and fully buffered body of an HTTP exchange.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
}

impl Response {
    /// Buffer a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let body = response.bytes().await?;
        Ok(Self { status, body })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response, keeping only the body.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }
}

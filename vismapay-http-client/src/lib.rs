//! # Visma Pay HTTP Client
//!
//! The transport used by `vismapay-payments`: a small JSON-over-HTTPS
//! client rooted at the gateway's API URL.
//!
//! Requests are sent once. Status codes are not inspected and bodies are
//! not parsed: every call resolves to the raw response or a transport
//! error, and the caller decides what the body means.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vismapay_http_client::{HttpClient, HttpClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpClientConfig::builder()
//!         .base_url("https://www.vismapay.com/pbwapi/")
//!         .build();
//!     let client = HttpClient::new(config)?;
//!
//!     let response = client
//!         .post("check_payment_status")
//!         .json(&serde_json::json!({ "token": "abc" }))
//!         .send()
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use request::RequestBuilder;
pub use response::Response;

// Re-export common types
pub use bytes::Bytes;
pub use http::StatusCode;

/// Prelude for common imports.
///
/// ```
/// use vismapay_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::request::RequestBuilder;
    pub use crate::response::Response;
    pub use http::StatusCode;
}

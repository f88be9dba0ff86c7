//! Visma Pay payment gateway client
//!
//! Builds signed requests for every gateway operation, classifies the
//! gateway's answers and verifies the signed callbacks sent to the
//! merchant's return and notify URLs.
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        PaymentClient                          │
//! │                                                               │
//! │  create_charge | capture | cancel | charge_card_token | ...  │
//! │        │                                                      │
//! │        ▼                                                      │
//! │  RequestBuilder ──► AuthcodeSigner (HMAC-SHA256, hex upper)   │
//! │        │                                                      │
//! │        ▼                                                      │
//! │   Transport (HttpClient) ──► classify ──► GatewayResponse     │
//! │                                                               │
//! │  verify_callback ──► CallbackVerifier ──► VerifiedCallback    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vismapay_payments::{Charge, ClientConfig, PaymentClient, PaymentMethod};
//!
//! # async fn run() -> vismapay_payments::PaymentResult<()> {
//! let client = PaymentClient::new(ClientConfig::new("api-key", "private-key"))?;
//!
//! let charge = Charge::new(
//!     "order-1234",
//!     2999,
//!     "EUR",
//!     PaymentMethod::e_payment("https://shop.example/return", "https://shop.example/notify"),
//! );
//! let response = client.create_charge(&charge).await?;
//!
//! if let Some(token) = response.token() {
//!     println!("Redirect to {}", client.config().payment_page_url(token));
//! }
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod signer;
pub mod transport;
pub mod types;

pub use callback::{CallbackParams, CallbackVerifier, ReturnCode, VerifiedCallback};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ErrorKind, PaymentError, PaymentResult};
pub use request::{Operation, RequestBuilder, SignedRequest};
pub use response::{classify, GatewayResponse};
pub use signer::AuthcodeSigner;
pub use transport::Transport;
pub use types::*;

use std::sync::Arc;
use tracing::{debug, warn};
use vismapay_http_client::HttpClient;

/// Gateway client
///
/// Holds an immutable configuration and a transport. Clones share both.
pub struct PaymentClient<T: Transport = HttpClient> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: ClientConfig,
    transport: T,
    verifier: CallbackVerifier,
}

impl PaymentClient<HttpClient> {
    /// Create a client that talks to the gateway over HTTP.
    pub fn new(config: ClientConfig) -> PaymentResult<Self> {
        let transport = HttpClient::new(config.http_config())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> PaymentClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let verifier = CallbackVerifier::new(config.private_key.clone());
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                verifier,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Payload builder over this client's configuration. Performs no I/O.
    pub fn request_builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.inner.config)
    }

    /// Post a signed request and classify the answer.
    pub async fn send(&self, request: SignedRequest) -> PaymentResult<GatewayResponse> {
        let operation = request.operation();
        debug!(operation = %operation, "Sending request to Visma Pay");

        let body = match self
            .inner
            .transport
            .post(operation.path(), request.body())
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!(operation = %operation, error = %e, "Visma Pay request failed");
                return Err(e.into());
            }
        };

        let result = classify(&body);
        match &result {
            Ok(_) => debug!(operation = %operation, "Visma Pay request succeeded"),
            Err(e) => debug!(operation = %operation, error = %e, "Visma Pay returned an error"),
        }
        result
    }

    /// Request a payment token for the hosted payment page.
    pub async fn create_charge(&self, charge: &Charge) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().create_charge(charge)?;
        self.send(request).await
    }

    /// Payment status by payment token
    pub async fn check_status_with_token(&self, token: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().check_status_with_token(token)?;
        self.send(request).await
    }

    /// Payment status by order number
    pub async fn check_status_with_order_number(
        &self,
        order_number: &str,
    ) -> PaymentResult<GatewayResponse> {
        let request = self
            .request_builder()
            .check_status_with_order_number(order_number)?;
        self.send(request).await
    }

    /// Capture an authorized payment
    pub async fn capture(&self, order_number: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().capture(order_number)?;
        self.send(request).await
    }

    /// Cancel an authorized payment
    pub async fn cancel(&self, order_number: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().cancel(order_number)?;
        self.send(request).await
    }

    /// Charge a stored card token.
    ///
    /// A customer-initiated charge may answer with a `verify` step, which
    /// surfaces as an application error whose body carries it.
    pub async fn charge_card_token(
        &self,
        charge: &CardTokenCharge,
    ) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().charge_card_token(charge)?;
        self.send(request).await
    }

    /// Card details stored behind a token
    pub async fn get_card_token(&self, card_token: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().get_card_token(card_token)?;
        self.send(request).await
    }

    /// Delete a stored card token
    pub async fn delete_card_token(&self, card_token: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().delete_card_token(card_token)?;
        self.send(request).await
    }

    /// Payment methods enabled for the merchant, optionally for one currency.
    pub async fn merchant_payment_methods(
        &self,
        currency: &str,
    ) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().merchant_payment_methods(currency)?;
        self.send(request).await
    }

    /// Payment details by order number
    pub async fn get_payment(&self, order_number: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().get_payment(order_number)?;
        self.send(request).await
    }

    /// Refund details
    pub async fn get_refund(&self, refund_id: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().get_refund(refund_id)?;
        self.send(request).await
    }

    /// Create a refund
    pub async fn create_refund(&self, refund: &Refund) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().create_refund(refund)?;
        self.send(request).await
    }

    /// Cancel a pending refund
    pub async fn cancel_refund(&self, refund_id: &str) -> PaymentResult<GatewayResponse> {
        let request = self.request_builder().cancel_refund(refund_id)?;
        self.send(request).await
    }

    /// Verify the authcode of return or notify callback parameters.
    pub fn verify_callback(&self, params: &CallbackParams) -> PaymentResult<VerifiedCallback> {
        self.inner.verifier.verify(params)
    }
}

impl<T: Transport> Clone for PaymentClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

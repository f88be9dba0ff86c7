// vismapay - A client for the Visma Pay payment gateway
//
// This library signs gateway requests, classifies the gateway's answers and
// verifies the callbacks sent to merchant return and notify URLs.

// Re-export the payment client
pub use vismapay_payments::*;

// Re-export the transport crate
pub use vismapay_http_client as http_client;

/// Prelude for common imports
///
/// ```
/// use vismapay::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CallbackParams,
        CardTokenCharge,
        Charge,
        ClientConfig,
        Customer,
        ErrorKind,
        GatewayResponse,
        Initiator,
        PaymentClient,
        PaymentError,
        PaymentMethod,
        PaymentResult,
        Product,
        Refund,
        RefundProduct,
        ReturnCode,
        Transport,
        VerifiedCallback,
    };
}

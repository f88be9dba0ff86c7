//! Signed request payloads
//!
//! [`RequestBuilder`] turns an operation's input into the JSON envelope the
//! gateway expects: version tag, API key, the operation's fields and the
//! `authcode`. Scalars are percent-encoded with the same character set as
//! JavaScript's `encodeURIComponent`; structured values are nested as-is.

use crate::config::ClientConfig;
use crate::error::PaymentResult;
use crate::signer::{request_message, AuthcodeSigner};
use crate::types::{require, CardTokenCharge, Charge, Refund, RefundItems};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Characters left unescaped by `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a scalar payload value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Gateway endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AuthPayment,
    CheckPaymentStatus,
    Capture,
    Cancel,
    ChargeCardToken,
    GetCardToken,
    DeleteCardToken,
    MerchantPaymentMethods,
    GetPayment,
    GetRefund,
    CreateRefund,
    CancelRefund,
}

impl Operation {
    /// Path relative to the API root
    pub fn path(&self) -> &'static str {
        match self {
            Self::AuthPayment => "auth_payment",
            Self::CheckPaymentStatus => "check_payment_status",
            Self::Capture => "capture",
            Self::Cancel => "cancel",
            Self::ChargeCardToken => "charge_card_token",
            Self::GetCardToken => "get_card_token",
            Self::DeleteCardToken => "delete_card_token",
            Self::MerchantPaymentMethods => "merchant_payment_methods",
            Self::GetPayment => "get_payment",
            Self::GetRefund => "get_refund",
            Self::CreateRefund => "create_refund",
            Self::CancelRefund => "cancel_refund",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A signed JSON envelope ready to be posted
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    operation: Operation,
    body: Value,
}

impl SignedRequest {
    /// Target endpoint
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// JSON body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume into the JSON body
    pub fn into_body(self) -> Value {
        self.body
    }

    /// The embedded authcode
    pub fn authcode(&self) -> Option<&str> {
        self.body.get("authcode").and_then(Value::as_str)
    }
}

/// Ordered field map under construction
struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    fn new(version: &str, api_key: &str) -> Self {
        Self {
            fields: Map::new(),
        }
        .scalar("version", version)
        .scalar("api_key", api_key)
    }

    fn scalar(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.fields.insert(
            key.to_string(),
            Value::String(encode_component(&value.to_string())),
        );
        self
    }

    fn nested<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> PaymentResult<Self> {
        self.fields
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    fn finish(self, operation: Operation) -> SignedRequest {
        SignedRequest {
            operation,
            body: Value::Object(self.fields),
        }
    }
}

/// Builds signed payloads for every gateway operation
///
/// Precondition checks run in a fixed order before anything is signed:
/// credentials first, then the operation's required fields.
pub struct RequestBuilder<'a> {
    config: &'a ClientConfig,
    signer: AuthcodeSigner,
}

impl<'a> RequestBuilder<'a> {
    /// Create a builder over the given configuration.
    pub fn new(config: &'a ClientConfig) -> Self {
        Self {
            config,
            signer: AuthcodeSigner::new(config.private_key.clone()),
        }
    }

    fn envelope(&self) -> Envelope {
        Envelope::new(&self.config.api_version, &self.config.api_key)
    }

    fn authcode(&self, fields: &[&str]) -> PaymentResult<String> {
        self.signer
            .sign(&request_message(&self.config.api_key, fields))
    }

    /// Envelope for operations identified by a single field.
    fn keyed(
        &self,
        context: &str,
        operation: Operation,
        field: &str,
        value: &str,
    ) -> PaymentResult<SignedRequest> {
        self.config.ensure_credentials()?;
        require(context, &field.replace('_', " "), value)?;

        let authcode = self.authcode(&[value])?;
        Ok(self
            .envelope()
            .scalar("authcode", authcode)
            .scalar(field, value)
            .finish(operation))
    }

    /// Payment token request for the hosted payment flow.
    pub fn create_charge(&self, charge: &Charge) -> PaymentResult<SignedRequest> {
        self.config.ensure_credentials()?;
        charge.validate()?;

        let authcode = self.authcode(&[&charge.order_number])?;
        let mut envelope = self
            .envelope()
            .scalar("order_number", &charge.order_number)
            .scalar("amount", charge.amount)
            .scalar("currency", &charge.currency)
            .nested("payment_method", &charge.payment_method)?
            .scalar("authcode", authcode);

        if let Some(email) = &charge.email {
            envelope = envelope.scalar("email", email);
        }
        if let Some(customer) = &charge.customer {
            envelope = envelope.nested("customer", customer)?;
        }
        if !charge.products.is_empty() {
            envelope = envelope.nested("products", &charge.products)?;
        }

        Ok(envelope.finish(Operation::AuthPayment))
    }

    /// Status lookup by payment token.
    pub fn check_status_with_token(&self, token: &str) -> PaymentResult<SignedRequest> {
        self.keyed(
            "check_status_with_token",
            Operation::CheckPaymentStatus,
            "token",
            token,
        )
    }

    /// Status lookup by order number.
    pub fn check_status_with_order_number(
        &self,
        order_number: &str,
    ) -> PaymentResult<SignedRequest> {
        self.keyed(
            "check_status_with_order_number",
            Operation::CheckPaymentStatus,
            "order_number",
            order_number,
        )
    }

    pub fn capture(&self, order_number: &str) -> PaymentResult<SignedRequest> {
        self.keyed("capture", Operation::Capture, "order_number", order_number)
    }

    pub fn cancel(&self, order_number: &str) -> PaymentResult<SignedRequest> {
        self.keyed("cancel", Operation::Cancel, "order_number", order_number)
    }

    /// Charge a stored card token. The authcode covers the order number
    /// and the card token.
    pub fn charge_card_token(&self, charge: &CardTokenCharge) -> PaymentResult<SignedRequest> {
        self.config.ensure_credentials()?;
        charge.validate()?;

        let authcode = self.authcode(&[&charge.order_number, &charge.card_token])?;
        let mut envelope = self
            .envelope()
            .scalar("order_number", &charge.order_number)
            .scalar("amount", charge.amount)
            .scalar("currency", &charge.currency)
            .scalar("card_token", &charge.card_token)
            .scalar("authcode", authcode);

        if let Some(email) = &charge.email {
            envelope = envelope.scalar("email", email);
        }
        if let Some(customer) = &charge.customer {
            envelope = envelope.nested("customer", customer)?;
        }
        if !charge.products.is_empty() {
            envelope = envelope.nested("products", &charge.products)?;
        }
        if let Some(initiator) = &charge.initiator {
            envelope = envelope.nested("initiator", initiator)?;
        }

        Ok(envelope.finish(Operation::ChargeCardToken))
    }

    pub fn get_card_token(&self, card_token: &str) -> PaymentResult<SignedRequest> {
        self.keyed(
            "get_card_token",
            Operation::GetCardToken,
            "card_token",
            card_token,
        )
    }

    pub fn delete_card_token(&self, card_token: &str) -> PaymentResult<SignedRequest> {
        self.keyed(
            "delete_card_token",
            Operation::DeleteCardToken,
            "card_token",
            card_token,
        )
    }

    /// Payment methods enabled for the merchant. Signed over the bare API
    /// key and sent with its own version tag; `currency` may be empty.
    pub fn merchant_payment_methods(&self, currency: &str) -> PaymentResult<SignedRequest> {
        self.config.ensure_credentials()?;

        let authcode = self.authcode(&[])?;
        Ok(Envelope::new(
            &self.config.merchant_payment_methods_version,
            &self.config.api_key,
        )
        .scalar("currency", currency)
        .scalar("authcode", authcode)
        .finish(Operation::MerchantPaymentMethods))
    }

    pub fn get_payment(&self, order_number: &str) -> PaymentResult<SignedRequest> {
        self.keyed(
            "get_payment",
            Operation::GetPayment,
            "order_number",
            order_number,
        )
    }

    pub fn get_refund(&self, refund_id: &str) -> PaymentResult<SignedRequest> {
        self.keyed("get_refund", Operation::GetRefund, "refund_id", refund_id)
    }

    /// Refund by amount or by product lines.
    pub fn create_refund(&self, refund: &Refund) -> PaymentResult<SignedRequest> {
        self.config.ensure_credentials()?;
        refund.validate()?;

        let authcode = self.authcode(&[&refund.order_number])?;
        let mut envelope = self
            .envelope()
            .scalar("authcode", authcode)
            .scalar("order_number", &refund.order_number);

        if let Some(email) = &refund.email {
            envelope = envelope.scalar("email", email);
        }
        envelope = match &refund.items {
            RefundItems::Amount(amount) => envelope.scalar("amount", amount),
            RefundItems::Products(products) => envelope.nested("products", products)?,
        };
        if let Some(notify_url) = &refund.notify_url {
            envelope = envelope.scalar("notify_url", notify_url);
        }

        Ok(envelope.finish(Operation::CreateRefund))
    }

    pub fn cancel_refund(&self, refund_id: &str) -> PaymentResult<SignedRequest> {
        self.keyed(
            "cancel_refund",
            Operation::CancelRefund,
            "refund_id",
            refund_id,
        )
    }
}

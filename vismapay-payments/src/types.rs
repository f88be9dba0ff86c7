//! Request types and data structures

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payment method of a charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Flow used to collect the payment
    #[serde(rename = "type")]
    pub kind: PaymentMethodType,
    /// Where the buyer returns after paying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    /// Where the gateway posts asynchronous notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    /// Payment page language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Restrict the payment page to these selections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<String>,
    /// Store the card as a reusable token
    #[serde(default, with = "int_flag", skip_serializing_if = "is_false")]
    pub register_card_token: bool,
    /// Unix timestamp after which the payment token expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_valid_until: Option<i64>,
    /// Cancel URL used instead of `return_url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_cancel_url: Option<String>,
}

impl PaymentMethod {
    /// Create a payment method of the given kind.
    pub fn new(kind: PaymentMethodType) -> Self {
        Self {
            kind,
            return_url: None,
            notify_url: None,
            lang: None,
            selected: Vec::new(),
            register_card_token: false,
            token_valid_until: None,
            override_cancel_url: None,
        }
    }

    /// Hosted payment page flow.
    pub fn e_payment(return_url: impl Into<String>, notify_url: impl Into<String>) -> Self {
        Self::new(PaymentMethodType::EPayment)
            .return_url(return_url)
            .notify_url(notify_url)
    }

    /// Card payment flow.
    pub fn card() -> Self {
        Self::new(PaymentMethodType::Card)
    }

    /// Set return URL
    pub fn return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    /// Set notify URL
    pub fn notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = Some(url.into());
        self
    }

    /// Set language
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Preselect a payment method on the payment page
    pub fn select(mut self, selected: impl Into<String>) -> Self {
        self.selected.push(selected.into());
        self
    }

    /// Register the card as a token
    pub fn register_card_token(mut self) -> Self {
        self.register_card_token = true;
        self
    }

    /// Set token expiry
    pub fn token_valid_until(mut self, timestamp: i64) -> Self {
        self.token_valid_until = Some(timestamp);
        self
    }

    /// Set cancel URL override
    pub fn override_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.override_cancel_url = Some(url.into());
        self
    }
}

/// Payment method kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethodType {
    #[serde(rename = "e-payment")]
    EPayment,
    #[serde(rename = "embedded")]
    Embedded,
    #[serde(rename = "terminal")]
    Terminal,
    #[serde(rename = "card")]
    Card,
}

/// Customer details, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_zip: Option<String>,
}

impl Customer {
    /// Create with name
    pub fn named(firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        Self {
            firstname: Some(firstname.into()),
            lastname: Some(lastname.into()),
            ..Default::default()
        }
    }

    /// Set email
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set street address, city and zip code
    pub fn address(
        mut self,
        street: impl Into<String>,
        city: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        self.address_street = Some(street.into());
        self.address_city = Some(city.into());
        self.address_zip = Some(zip.into());
        self
    }
}

/// Order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub count: u32,
    /// Unit price without tax, in minor units
    pub pretax_price: u64,
    /// Tax percentage
    pub tax: f64,
    /// Unit price with tax, in minor units
    pub price: u64,
    #[serde(rename = "type")]
    pub kind: ProductType,
}

impl Product {
    /// Create a tax-free product line of kind [`ProductType::Product`].
    pub fn new(id: impl Into<String>, title: impl Into<String>, count: u32, price: u64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            count,
            pretax_price: price,
            tax: 0.0,
            price,
            kind: ProductType::Product,
        }
    }

    /// Set pretax price and tax percentage
    pub fn taxed(mut self, pretax_price: u64, tax: f64) -> Self {
        self.pretax_price = pretax_price;
        self.tax = tax;
        self
    }

    /// Set line kind
    pub fn kind(mut self, kind: ProductType) -> Self {
        self.kind = kind;
        self
    }
}

/// Order line kind, sent as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProductType {
    Product = 1,
    Shipping = 2,
    Handling = 3,
}

impl From<ProductType> for u8 {
    fn from(kind: ProductType) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for ProductType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Product),
            2 => Ok(Self::Shipping),
            3 => Ok(Self::Handling),
            other => Err(format!("unknown product type {}", other)),
        }
    }
}

/// Charge request
///
/// The gateway requires product prices to add up to `amount`; this is not
/// checked locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Merchant order number, unique per merchant
    pub order_number: String,
    /// Amount in minor units
    pub amount: u64,
    /// ISO 4217 currency code
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub email: Option<String>,
    pub customer: Option<Customer>,
    pub products: Vec<Product>,
}

impl Charge {
    /// Create a charge request
    pub fn new(
        order_number: impl Into<String>,
        amount: u64,
        currency: impl Into<String>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            amount,
            currency: currency.into(),
            payment_method,
            email: None,
            customer: None,
            products: Vec::new(),
        }
    }

    /// With email
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With customer
    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Append a product line
    pub fn product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> PaymentResult<()> {
        require("create_charge", "order number", &self.order_number)?;
        require_amount("create_charge", self.amount)?;
        require("create_charge", "currency", &self.currency)
    }
}

/// Charge against a stored card token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTokenCharge {
    pub order_number: String,
    /// Amount in minor units
    pub amount: u64,
    pub currency: String,
    pub card_token: String,
    pub email: Option<String>,
    pub customer: Option<Customer>,
    pub products: Vec<Product>,
    pub initiator: Option<Initiator>,
}

impl CardTokenCharge {
    /// Create a card token charge
    pub fn new(
        order_number: impl Into<String>,
        amount: u64,
        currency: impl Into<String>,
        card_token: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            amount,
            currency: currency.into(),
            card_token: card_token.into(),
            email: None,
            customer: None,
            products: Vec::new(),
            initiator: None,
        }
    }

    /// With email
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With customer
    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Append a product line
    pub fn product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// With transaction initiator
    pub fn initiator(mut self, initiator: Initiator) -> Self {
        self.initiator = Some(initiator);
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> PaymentResult<()> {
        require("charge_card_token", "order number", &self.order_number)?;
        require_amount("charge_card_token", self.amount)?;
        require("charge_card_token", "currency", &self.currency)?;
        require("charge_card_token", "card token", &self.card_token)
    }
}

/// Who initiated a card token transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiator {
    #[serde(rename = "type")]
    pub kind: InitiatorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
}

impl Initiator {
    /// Merchant initiated transaction
    pub fn merchant() -> Self {
        Self {
            kind: InitiatorType::Merchant,
            return_url: None,
            notify_url: None,
        }
    }

    /// Cardholder initiated transaction; may require a 3-D Secure step
    /// that returns to `return_url`.
    pub fn customer(return_url: impl Into<String>, notify_url: impl Into<String>) -> Self {
        Self {
            kind: InitiatorType::Customer,
            return_url: Some(return_url.into()),
            notify_url: Some(notify_url.into()),
        }
    }
}

/// Initiator kind, sent as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InitiatorType {
    Merchant = 1,
    Customer = 2,
}

impl From<InitiatorType> for u8 {
    fn from(kind: InitiatorType) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for InitiatorType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Merchant),
            2 => Ok(Self::Customer),
            other => Err(format!("unknown initiator type {}", other)),
        }
    }
}

/// Refund request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub order_number: String,
    pub email: Option<String>,
    pub notify_url: Option<String>,
    pub items: RefundItems,
}

impl Refund {
    /// Refund a fixed amount
    pub fn amount(order_number: impl Into<String>, amount: u64) -> Self {
        Self::with_items(order_number, RefundItems::Amount(amount))
    }

    /// Refund individual product lines
    pub fn products(order_number: impl Into<String>, products: Vec<RefundProduct>) -> Self {
        Self::with_items(order_number, RefundItems::Products(products))
    }

    fn with_items(order_number: impl Into<String>, items: RefundItems) -> Self {
        Self {
            order_number: order_number.into(),
            email: None,
            notify_url: None,
            items,
        }
    }

    /// With email
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With notify URL
    pub fn notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = Some(url.into());
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> PaymentResult<()> {
        require("create_refund", "order number", &self.order_number)?;
        match &self.items {
            RefundItems::Amount(amount) => require_amount("create_refund", *amount),
            RefundItems::Products(products) if products.is_empty() => Err(
                PaymentError::InvalidParameters("create_refund: products missing".to_string()),
            ),
            RefundItems::Products(_) => Ok(()),
        }
    }
}

/// What a refund covers: an amount or a list of product lines, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundItems {
    /// Amount in minor units
    Amount(u64),
    Products(Vec<RefundProduct>),
}

/// Product line to refund, referencing the gateway's product id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundProduct {
    pub product_id: u64,
    pub count: u32,
}

impl RefundProduct {
    pub fn new(product_id: u64, count: u32) -> Self {
        Self { product_id, count }
    }
}

/// Fail with an invalid-parameters error if `value` is empty.
pub(crate) fn require(operation: &str, field: &str, value: &str) -> PaymentResult<()> {
    if value.is_empty() {
        Err(PaymentError::InvalidParameters(format!(
            "{}: {} missing",
            operation, field
        )))
    } else {
        Ok(())
    }
}

fn require_amount(operation: &str, amount: u64) -> PaymentResult<()> {
    if amount == 0 {
        Err(PaymentError::InvalidParameters(format!(
            "{}: amount missing",
            operation
        )))
    } else {
        Ok(())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// `bool` on the wire as `0`/`1`
mod int_flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

//! Authcode signing
//!
//! Every request and every callback is authenticated with an *authcode*:
//! the uppercase hex HMAC-SHA256 of a pipe-delimited canonical message,
//! keyed with the merchant private key.
//!
//! ```text
//! request:   api_key | field | field ...
//! callback:  RETURN_CODE | ORDER_NUMBER [| SETTLED] [| CONTACT_ID] [| INCIDENT_ID]
//! ```

use crate::error::{PaymentError, PaymentResult};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator between canonical message fields
pub const SEPARATOR: char = '|';

/// HMAC-SHA256 signer keyed with the merchant private key
#[derive(Clone)]
pub struct AuthcodeSigner {
    private_key: SecretString,
}

impl AuthcodeSigner {
    /// Create a signer for the given private key.
    pub fn new(private_key: SecretString) -> Self {
        Self { private_key }
    }

    /// Sign a canonical message.
    ///
    /// Returns 64 uppercase hex characters. An empty private key is a
    /// configuration error since it would produce a meaningless digest.
    pub fn sign(&self, message: &str) -> PaymentResult<String> {
        let key = self.private_key.expose_secret();
        if key.is_empty() {
            return Err(PaymentError::Config("Private key not set".to_string()));
        }

        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| PaymentError::Config(e.to_string()))?;
        mac.update(message.as_bytes());
        Ok(hex::encode_upper(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for AuthcodeSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthcodeSigner")
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Canonical message for a request: the API key followed by the
/// operation's identifying fields.
///
/// With no fields the message is the bare API key.
pub fn request_message(api_key: &str, fields: &[&str]) -> String {
    let mut message = String::from(api_key);
    for field in fields {
        message.push(SEPARATOR);
        message.push_str(field);
    }
    message
}

/// Canonical message for callback parameters.
///
/// Optional fields are appended in fixed order, each only when present.
pub fn callback_message(
    return_code: &str,
    order_number: &str,
    settled: Option<&str>,
    contact_id: Option<&str>,
    incident_id: Option<&str>,
) -> String {
    let mut message = format!("{}{}{}", return_code, SEPARATOR, order_number);
    for value in [settled, contact_id, incident_id].into_iter().flatten() {
        message.push(SEPARATOR);
        message.push_str(value);
    }
    message
}

/// Constant-time string comparison
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

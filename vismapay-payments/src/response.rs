//! Gateway response classification
//!
//! Every gateway answer is a JSON object with a numeric `result` field.
//! Zero means success; anything else is an application error carrying the
//! whole body. The HTTP status code plays no part.

use crate::error::{PaymentError, PaymentResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed gateway body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayResponse {
    body: Map<String, Value>,
}

impl GatewayResponse {
    /// The `result` code, when it is a whole number.
    ///
    /// `0.0` reads as `0`; strings and fractions read as `None`.
    pub fn result(&self) -> Option<i64> {
        let value = self.body.get("result")?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        })
    }

    /// Whether `result` is zero.
    pub fn is_success(&self) -> bool {
        self.result() == Some(0)
    }

    pub(crate) fn result_display(&self) -> String {
        match self.body.get("result") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "null".to_string(),
        }
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Payment token returned by `create_charge`.
    pub fn token(&self) -> Option<&str> {
        self.body.get("token").and_then(Value::as_str)
    }

    /// Error messages listed by the gateway.
    pub fn errors(&self) -> Vec<String> {
        match self.body.get("errors") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Incident identifier attached to some failures.
    pub fn incident_id(&self) -> Option<String> {
        match self.body.get("incident_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Cardholder verification step for customer-initiated token charges.
    pub fn verify(&self) -> Option<&Value> {
        self.body.get("verify")
    }

    /// Deserialize the body into a typed structure.
    pub fn deserialize<T: DeserializeOwned>(&self) -> PaymentResult<T> {
        Ok(serde_json::from_value(Value::Object(self.body.clone()))?)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.body
    }
}

/// Classify a raw response body.
///
/// - not a JSON object, or no `result` field: [`PaymentError::MalformedResponse`]
/// - numeric `result` equal to 0 (`0` or `0.0`): the parsed body
/// - any other `result`: [`PaymentError::Application`] with the parsed body
pub fn classify(body: &[u8]) -> PaymentResult<GatewayResponse> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PaymentError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let Value::Object(body) = value else {
        return Err(PaymentError::MalformedResponse(
            "body is not a JSON object".to_string(),
        ));
    };

    if !body.contains_key("result") {
        return Err(PaymentError::MalformedResponse(
            "missing result field".to_string(),
        ));
    }

    let response = GatewayResponse { body };
    if response.is_success() {
        Ok(response)
    } else {
        Err(PaymentError::Application(response))
    }
}

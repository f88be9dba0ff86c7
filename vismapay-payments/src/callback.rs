//! Return and notify callback verification
//!
//! After a payment the gateway redirects the customer to the merchant's
//! return URL and calls the notify URL, both with query parameters signed
//! over `RETURN_CODE|ORDER_NUMBER[|SETTLED][|CONTACT_ID][|INCIDENT_ID]`.

use crate::error::{PaymentError, PaymentResult};
use crate::signer::{callback_message, constant_time_compare, AuthcodeSigner};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

pub const RETURN_CODE: &str = "RETURN_CODE";
pub const ORDER_NUMBER: &str = "ORDER_NUMBER";
pub const SETTLED: &str = "SETTLED";
pub const CONTACT_ID: &str = "CONTACT_ID";
pub const INCIDENT_ID: &str = "INCIDENT_ID";
pub const AUTHCODE: &str = "AUTHCODE";

/// Raw callback query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackParams {
    params: BTreeMap<String, String>,
}

impl CallbackParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an URL query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> PaymentResult<Self> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query.trim_start_matches('?')).map_err(|e| {
                PaymentError::InvalidParameters(format!("callback query: {}", e))
            })?;
        Ok(pairs.into_iter().collect())
    }

    /// Add a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn required(&self, key: &str) -> PaymentResult<&str> {
        self.get(key).ok_or_else(|| {
            PaymentError::InvalidParameters(format!("callback: {} missing", key))
        })
    }
}

impl<K, V> FromIterator<(K, V)> for CallbackParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for CallbackParams {
    fn from(params: HashMap<String, String>) -> Self {
        params.into_iter().collect()
    }
}

/// Payment outcome reported by `RETURN_CODE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnCode {
    Success,
    Failed,
    StatusUpdateFailed,
    Maintenance,
    Unknown(String),
}

impl ReturnCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "0" => Self::Success,
            "1" => Self::Failed,
            "4" => Self::StatusUpdateFailed,
            "10" => Self::Maintenance,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Human readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "Payment succeeded",
            Self::Failed => "Payment failed!",
            Self::StatusUpdateFailed => {
                "Transaction status could not be updated after customer returned from the web page of a bank."
            }
            Self::Maintenance => "Maintenance break",
            Self::Unknown(_) => "Unknown return value",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Callback parameters whose authcode has been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCallback {
    params: CallbackParams,
}

impl VerifiedCallback {
    pub fn order_number(&self) -> &str {
        self.params.get(ORDER_NUMBER).unwrap_or_default()
    }

    pub fn return_code(&self) -> ReturnCode {
        ReturnCode::parse(self.params.get(RETURN_CODE).unwrap_or_default())
    }

    /// Whether the payment was settled, when the gateway says so.
    pub fn settled(&self) -> Option<bool> {
        self.params.get(SETTLED).map(|s| s == "1")
    }

    pub fn contact_id(&self) -> Option<&str> {
        self.params.get(CONTACT_ID)
    }

    pub fn incident_id(&self) -> Option<&str> {
        self.params.get(INCIDENT_ID)
    }

    /// All received parameters.
    pub fn params(&self) -> &CallbackParams {
        &self.params
    }
}

/// Verifies callback authcodes
#[derive(Debug, Clone)]
pub struct CallbackVerifier {
    signer: AuthcodeSigner,
}

impl CallbackVerifier {
    pub fn new(private_key: SecretString) -> Self {
        Self {
            signer: AuthcodeSigner::new(private_key),
        }
    }

    /// Check the `AUTHCODE` of a callback.
    ///
    /// Missing `RETURN_CODE`, `ORDER_NUMBER` or `AUTHCODE` is an
    /// invalid-parameters error; a wrong authcode is
    /// [`PaymentError::MacMismatch`]. The comparison is case-sensitive.
    pub fn verify(&self, params: &CallbackParams) -> PaymentResult<VerifiedCallback> {
        let return_code = params.required(RETURN_CODE)?;
        let order_number = params.required(ORDER_NUMBER)?;
        let authcode = params.required(AUTHCODE)?;

        let message = callback_message(
            return_code,
            order_number,
            params.get(SETTLED),
            params.get(CONTACT_ID),
            params.get(INCIDENT_ID),
        );
        let expected = self.signer.sign(&message)?;

        if !constant_time_compare(&expected, authcode) {
            warn!(order_number, "Callback authcode mismatch");
            return Err(PaymentError::MacMismatch);
        }

        debug!(order_number, return_code, "Callback verified");
        Ok(VerifiedCallback {
            params: params.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn verifier() -> CallbackVerifier {
        CallbackVerifier::new(SecretString::from("privatekey".to_string()))
    }

    fn settled_params() -> CallbackParams {
        CallbackParams::new()
            .with(RETURN_CODE, "0")
            .with(ORDER_NUMBER, "123")
            .with(SETTLED, "1")
            .with(
                AUTHCODE,
                "E5CD8307975FE9DA10C391EB47E48E47CBBA2A171C187E35782B920F268ECFC9",
            )
    }

    #[test]
    fn test_settled_callback() {
        let callback = verifier().verify(&settled_params()).unwrap();
        assert_eq!(callback.order_number(), "123");
        assert_eq!(callback.return_code(), ReturnCode::Success);
        assert_eq!(callback.settled(), Some(true));
        assert_eq!(callback.contact_id(), None);
    }

    #[test]
    fn test_contact_id_is_signed() {
        let params = CallbackParams::new()
            .with(RETURN_CODE, "0")
            .with(ORDER_NUMBER, "123")
            .with(SETTLED, "1")
            .with(CONTACT_ID, "123")
            .with(
                AUTHCODE,
                "02BAD88FA52FE5FBE9FA16EDB5313FE9690D03DDCF476F0FBFFAD502CE2A64FF",
            );
        let callback = verifier().verify(&params).unwrap();
        assert_eq!(callback.contact_id(), Some("123"));
    }

    #[test]
    fn test_unsettled_callbacks() {
        let plain = CallbackParams::new()
            .with(RETURN_CODE, "0")
            .with(ORDER_NUMBER, "123")
            .with(SETTLED, "0")
            .with(
                AUTHCODE,
                "5F7B2BBE36C952C7DF6E75577538ABA01AD871B384E8F8636A740F08E0D95724",
            );
        assert_eq!(verifier().verify(&plain).unwrap().settled(), Some(false));

        let with_contact = CallbackParams::new()
            .with(RETURN_CODE, "0")
            .with(ORDER_NUMBER, "123")
            .with(SETTLED, "0")
            .with(CONTACT_ID, "123")
            .with(
                AUTHCODE,
                "5866C52ADEEA44EB1B04CA1EA840F5F97B92D337340DC5F2ED1B701DA8BF1150",
            );
        assert!(verifier().verify(&with_contact).is_ok());
    }

    #[test]
    fn test_failed_callback_with_incident() {
        let params = CallbackParams::new()
            .with(RETURN_CODE, "1")
            .with(ORDER_NUMBER, "123")
            .with(INCIDENT_ID, "incident")
            .with(
                AUTHCODE,
                "98F6866F50BC63B27B170E44134BE2B692FCEF1E3391D7785BFFEBAB3CFB301B",
            );
        let callback = verifier().verify(&params).unwrap();
        assert_eq!(callback.return_code(), ReturnCode::Failed);
        assert_eq!(callback.incident_id(), Some("incident"));
        assert_eq!(callback.settled(), None);
    }

    #[test]
    fn test_failed_callback_without_optionals() {
        let params = CallbackParams::new()
            .with(RETURN_CODE, "1")
            .with(ORDER_NUMBER, "123")
            .with(
                AUTHCODE,
                "AF870E7BA31BC7A413E5FF24C6DA3CDBA1BF542EF591357CAD98B16662BFCF1F",
            );
        assert!(verifier().verify(&params).is_ok());
    }

    #[test]
    fn test_wrong_authcode() {
        let params = CallbackParams::new()
            .with(RETURN_CODE, "0")
            .with(ORDER_NUMBER, "123")
            .with(SETTLED, "1")
            .with(
                AUTHCODE,
                "98F6866F50BC63B27B170E44134BE2B692FCE81E3391D7785BFFEBAB3CFB301D",
            );
        let err = verifier().verify(&params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn test_any_single_character_change_fails() {
        let valid = settled_params();
        let authcode = valid.get(AUTHCODE).unwrap().to_string();

        for i in 0..authcode.len() {
            let mut chars: Vec<char> = authcode.chars().collect();
            chars[i] = if chars[i] == '0' { '1' } else { '0' };
            let tampered = valid.clone().with(AUTHCODE, chars.into_iter().collect::<String>());
            assert!(matches!(
                verifier().verify(&tampered),
                Err(PaymentError::MacMismatch)
            ));
        }
    }

    #[test]
    fn test_lowercase_authcode_is_rejected() {
        let valid = settled_params();
        let lower = valid.get(AUTHCODE).unwrap().to_lowercase();
        let params = valid.with(AUTHCODE, lower);
        assert!(matches!(
            verifier().verify(&params),
            Err(PaymentError::MacMismatch)
        ));
    }

    #[test]
    fn test_tampered_field_fails() {
        let params = settled_params().with(ORDER_NUMBER, "124");
        assert!(matches!(
            verifier().verify(&params),
            Err(PaymentError::MacMismatch)
        ));
    }

    #[test]
    fn test_missing_fields() {
        for key in [RETURN_CODE, ORDER_NUMBER, AUTHCODE] {
            let params: CallbackParams = settled_params()
                .params
                .into_iter()
                .filter(|(k, _)| k != key)
                .collect();
            let err = verifier().verify(&params).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameters, "{}", key);
        }
    }

    #[test]
    fn test_from_query() {
        let params = CallbackParams::from_query(
            "?RETURN_CODE=0&ORDER_NUMBER=123&SETTLED=1&AUTHCODE=E5CD8307975FE9DA10C391EB47E48E47CBBA2A171C187E35782B920F268ECFC9",
        )
        .unwrap();
        assert!(verifier().verify(&params).is_ok());
    }

    #[test]
    fn test_from_hash_map() {
        let map: HashMap<String, String> = settled_params()
            .params
            .into_iter()
            .collect();
        assert_eq!(CallbackParams::from(map), settled_params());
    }

    #[test]
    fn test_return_code_descriptions() {
        assert_eq!(ReturnCode::parse("1").description(), "Payment failed!");
        assert_eq!(ReturnCode::parse("10"), ReturnCode::Maintenance);
        assert_eq!(
            ReturnCode::parse("99").to_string(),
            "Unknown return value"
        );
        assert!(ReturnCode::parse("0").is_success());
    }
}

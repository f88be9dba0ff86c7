//! Error types for gateway operations

use crate::response::GatewayResponse;
use thiserror::Error;
use vismapay_http_client::HttpClientError;

/// Payment error types
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Credentials are missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required field is missing or empty
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The network exchange itself failed
    #[error("Transport error: {0}")]
    Transport(#[from] HttpClientError),

    /// Body is not JSON or carries no `result` field
    #[error("Malformed response from Visma Pay API: {0}")]
    MalformedResponse(String),

    /// Gateway answered with a non-zero result code
    #[error("Visma Pay API returned result {}", .0.result_display())]
    Application(GatewayResponse),

    /// Callback authcode does not match the recomputed one
    #[error("MAC check failed")]
    MacMismatch,

    /// A structured payload value could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

impl PaymentError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::Transport(_) => ErrorKind::Transport,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Application(_) => ErrorKind::Application,
            Self::MacMismatch => ErrorKind::Integrity,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// The gateway body attached to an application error.
    pub fn response(&self) -> Option<&GatewayResponse> {
        match self {
            Self::Application(response) => Some(response),
            _ => None,
        }
    }

    /// Consume the error, returning the attached gateway body if any.
    pub fn into_response(self) -> Option<GatewayResponse> {
        match self {
            Self::Application(response) => Some(response),
            _ => None,
        }
    }
}

/// Result type for gateway operations
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Stable classification of a [`PaymentError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credentials unset
    Configuration,
    /// Required input missing
    InvalidParameters,
    /// Network failure
    Transport,
    /// Unparseable or incomplete body
    MalformedResponse,
    /// Non-zero result code
    Application,
    /// Callback signature mismatch
    Integrity,
    /// Local encoding failure
    Serialization,
}

impl ErrorKind {
    /// Numeric error code shared with other Visma Pay client libraries.
    ///
    /// Serialization failures share the invalid-parameters code.
    pub fn code(&self) -> u8 {
        match self {
            Self::MalformedResponse => 1,
            Self::Configuration => 2,
            Self::InvalidParameters | Self::Serialization => 3,
            Self::Transport => 4,
            Self::Integrity => 5,
            Self::Application => 6,
        }
    }

    /// Short description of the kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MalformedResponse => "Malformed response from Visma Pay API",
            Self::Configuration => "Private key or api key not set",
            Self::InvalidParameters => "Invalid parameters",
            Self::Transport => "Protocol error",
            Self::Integrity => "Mac check failed",
            Self::Application => "API returned an error",
            Self::Serialization => "Payload could not be encoded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::classify;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ErrorKind::MalformedResponse.code(), 1);
        assert_eq!(ErrorKind::Configuration.code(), 2);
        assert_eq!(ErrorKind::InvalidParameters.code(), 3);
        assert_eq!(ErrorKind::Transport.code(), 4);
        assert_eq!(ErrorKind::Integrity.code(), 5);
        assert_eq!(ErrorKind::Application.code(), 6);
    }

    #[test]
    fn test_application_error_carries_body() {
        let err = classify(br#"{"result":1,"errors":["bad"]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Application);
        assert_eq!(err.to_string(), "Visma Pay API returned result 1");

        let response = err.response().unwrap();
        assert_eq!(response.result(), Some(1));
        assert_eq!(response.errors(), vec!["bad".to_string()]);
    }

    #[test]
    fn test_transport_conversion() {
        let err: PaymentError = HttpClientError::Connection("refused".into()).into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.response().is_none());
    }

    #[test]
    fn test_mac_mismatch_display() {
        assert_eq!(PaymentError::MacMismatch.to_string(), "MAC check failed");
        assert_eq!(PaymentError::MacMismatch.kind(), ErrorKind::Integrity);
    }
}

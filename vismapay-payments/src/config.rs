//! Client configuration
//!
//! Credentials and endpoint settings are fixed when a
//! [`PaymentClient`](crate::PaymentClient) is built. Empty credentials are
//! accepted here and rejected by each signed operation instead.

use crate::error::{PaymentError, PaymentResult};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use vismapay_http_client::HttpClientConfig;

/// Default API version tag sent with every request
pub const DEFAULT_API_VERSION: &str = "w3.1";

/// Version tag of the merchant payment methods endpoint
pub const MERCHANT_PAYMENT_METHODS_VERSION: &str = "2";

/// Default gateway host
pub const DEFAULT_HOST: &str = "www.vismapay.com";

/// Default path of the API root on the gateway host
pub const DEFAULT_API_ROOT: &str = "/pbwapi";

/// Environment variable prefix used by [`ClientConfig::from_env`]
pub const ENV_PREFIX: &str = "VISMAPAY";

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Merchant API key
    pub api_key: String,
    /// Private key used as HMAC key material
    pub private_key: SecretString,
    /// Version tag for all operations except merchant payment methods
    pub api_version: String,
    /// Version tag for merchant payment methods
    pub merchant_payment_methods_version: String,
    /// Gateway host name, optionally with port
    pub host: String,
    /// Use `https` (default) or plain `http`
    pub use_https: bool,
    /// API root path on the host
    pub api_root: String,
    /// Transport settings
    pub http: HttpClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            private_key: SecretString::from(String::new()),
            api_version: DEFAULT_API_VERSION.to_string(),
            merchant_payment_methods_version: MERCHANT_PAYMENT_METHODS_VERSION.to_string(),
            host: DEFAULT_HOST.to_string(),
            use_https: true,
            api_root: DEFAULT_API_ROOT.to_string(),
            http: HttpClientConfig {
                user_agent: format!("vismapay-rs/{}", env!("CARGO_PKG_VERSION")),
                ..HttpClientConfig::default()
            },
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Shorthand for a default configuration with the given credentials.
    pub fn new(api_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self::builder()
            .api_key(api_key)
            .private_key(private_key)
            .build()
    }

    /// Load configuration from `VISMAPAY_*` environment variables.
    ///
    /// Reads `VISMAPAY_API_KEY`, `VISMAPAY_PRIVATE_KEY`,
    /// `VISMAPAY_API_VERSION`, `VISMAPAY_HOST` and `VISMAPAY_USE_HTTPS`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> PaymentResult<Self> {
        Self::from_lookup(|key| env::var(format!("{}_{}", ENV_PREFIX, key)).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Keys are passed without the `VISMAPAY_` prefix.
    pub fn from_lookup<F>(lookup: F) -> PaymentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(api_key) = lookup("API_KEY") {
            builder = builder.api_key(api_key);
        }
        if let Some(private_key) = lookup("PRIVATE_KEY") {
            builder = builder.private_key(private_key);
        }
        if let Some(version) = lookup("API_VERSION") {
            builder = builder.api_version(version);
        }
        if let Some(host) = lookup("HOST") {
            builder = builder.host(host);
        }
        if let Some(flag) = lookup("USE_HTTPS") {
            builder = builder.use_https(parse_flag(&flag)?);
        }

        Ok(builder.build())
    }

    /// Whether both the API key and the private key are set.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.private_key.expose_secret().is_empty()
    }

    /// Fail with a configuration error unless credentials are set.
    pub fn ensure_credentials(&self) -> PaymentResult<()> {
        if self.has_credentials() {
            Ok(())
        } else {
            Err(PaymentError::Config(
                "Private key or api key not set".to_string(),
            ))
        }
    }

    /// Absolute URL of the API root, without trailing slash.
    pub fn api_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!(
            "{}://{}/{}",
            scheme,
            self.host.trim_end_matches('/'),
            self.api_root.trim_matches('/')
        )
    }

    /// URL of the hosted payment page for a token returned by `create_charge`.
    pub fn payment_page_url(&self, token: &str) -> String {
        format!("{}/token/{}", self.api_url(), token)
    }

    /// Transport settings with the base URL pointed at the API root.
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: Some(format!("{}/", self.api_url())),
            ..self.http.clone()
        }
    }
}

fn parse_flag(value: &str) -> PaymentResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PaymentError::Config(format!(
            "{}_USE_HTTPS must be a boolean, got '{}'",
            ENV_PREFIX, other
        ))),
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Set the private key.
    pub fn private_key(mut self, private_key: impl Into<String>) -> Self {
        self.config.private_key = SecretString::from(private_key.into());
        self
    }

    /// Set the API version tag.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// Set the gateway host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Switch between `https` and `http`.
    pub fn use_https(mut self, use_https: bool) -> Self {
        self.config.use_https = use_https;
        self
    }

    /// Set the API root path.
    pub fn api_root(mut self, api_root: impl Into<String>) -> Self {
        self.config.api_root = api_root.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = timeout;
        self
    }

    /// Replace the transport settings.
    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_version, "w3.1");
        assert_eq!(config.merchant_payment_methods_version, "2");
        assert_eq!(config.api_url(), "https://www.vismapay.com/pbwapi");
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_missing_credentials() {
        let err = ClientConfig::new("apikey", "").ensure_credentials().unwrap_err();
        assert!(matches!(err, PaymentError::Config(_)));

        let err = ClientConfig::new("", "privatekey")
            .ensure_credentials()
            .unwrap_err();
        assert!(matches!(err, PaymentError::Config(_)));

        assert!(ClientConfig::new("apikey", "privatekey")
            .ensure_credentials()
            .is_ok());
    }

    #[test]
    fn test_urls() {
        let config = ClientConfig::builder()
            .host("localhost:8080")
            .use_https(false)
            .build();

        assert_eq!(config.api_url(), "http://localhost:8080/pbwapi");
        assert_eq!(
            config.payment_page_url("abc"),
            "http://localhost:8080/pbwapi/token/abc"
        );
        assert_eq!(
            config.http_config().base_url.as_deref(),
            Some("http://localhost:8080/pbwapi/")
        );
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("API_KEY", "apikey"),
            ("PRIVATE_KEY", "privatekey"),
            ("HOST", "test.vismapay.com"),
            ("USE_HTTPS", "false"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_key, "apikey");
        assert_eq!(config.private_key.expose_secret(), "privatekey");
        assert_eq!(config.api_version, "w3.1");
        assert_eq!(config.api_url(), "http://test.vismapay.com/pbwapi");
    }

    #[test]
    fn test_from_lookup_rejects_bad_flag() {
        let err = ClientConfig::from_lookup(|key| {
            (key == "USE_HTTPS").then(|| "maybe".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, PaymentError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = ClientConfig::new("apikey", "privatekey");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("privatekey"));
    }
}

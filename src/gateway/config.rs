//! Gateway configuration types.

use crate::rpc::DEFAULT_ENDPOINT;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable holding the access key id.
pub const ENV_ACCESS_KEY_ID: &str = "ALIYUN_ACCESS_KEY_ID";
/// Environment variable holding the access key secret.
pub const ENV_ACCESS_KEY_SECRET: &str = "ALIYUN_ACCESS_KEY_SECRET";
/// Environment variable holding the region id.
pub const ENV_REGION_ID: &str = "ALIYUN_REGION_ID";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ALIYUN_SMS_TIMEOUT_SECS";
/// Environment variable overriding the connect timeout, in seconds.
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "ALIYUN_SMS_CONNECT_TIMEOUT_SECS";
/// Environment variable overriding the RPC endpoint.
pub const ENV_ENDPOINT: &str = "ALIYUN_SMS_ENDPOINT";

/// Region used when none is configured.
pub const DEFAULT_REGION_ID: &str = "cn-hangzhou";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from loading or validating a [`GatewayConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),

    /// A value could not be parsed.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    /// A field failed validation.
    #[error("{0}")]
    Validation(String),
}

/// Configuration for the SMS gateway.
///
/// Loaded once and immutable afterwards.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Access key id.
    pub access_key_id: String,
    /// Access key secret.
    pub access_key_secret: SecretString,
    /// Region id sent as `RegionId` with every request.
    pub region_id: String,
    /// Timeout applied to each whole request.
    pub timeout: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// RPC endpoint.
    pub endpoint: Url,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"[REDACTED]")
            .field("region_id", &self.region_id)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GatewayConfig {
    /// Create a new builder for GatewayConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dysms_gateway::GatewayConfig;
    /// use std::time::Duration;
    ///
    /// let config = GatewayConfig::builder("key_id", "secret")
    ///     .region_id("cn-shanghai")
    ///     .timeout(Duration::from_secs(3))
    ///     .build();
    ///
    /// assert_eq!(config.region_id, "cn-shanghai");
    /// assert_eq!(config.timeout, Duration::from_secs(3));
    /// ```
    pub fn builder(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> GatewayConfigBuilder {
        GatewayConfigBuilder::new(access_key_id, access_key_secret)
    }

    /// Load the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup.
    ///
    /// Reads [`ENV_ACCESS_KEY_ID`], [`ENV_ACCESS_KEY_SECRET`] (required),
    /// [`ENV_REGION_ID`], [`ENV_TIMEOUT_SECS`], [`ENV_CONNECT_TIMEOUT_SECS`]
    /// and [`ENV_ENDPOINT`] (optional). The result is validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_key_id = get(ENV_ACCESS_KEY_ID).ok_or(ConfigError::MissingVar(ENV_ACCESS_KEY_ID))?;
        let access_key_secret =
            get(ENV_ACCESS_KEY_SECRET).ok_or(ConfigError::MissingVar(ENV_ACCESS_KEY_SECRET))?;

        let mut builder = Self::builder(access_key_id, access_key_secret);

        if let Some(region_id) = get(ENV_REGION_ID) {
            builder = builder.region_id(region_id);
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            builder = builder.timeout(parse_secs(ENV_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = get(ENV_CONNECT_TIMEOUT_SECS) {
            builder = builder.connect_timeout(parse_secs(ENV_CONNECT_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = get(ENV_ENDPOINT) {
            let endpoint = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
                key: ENV_ENDPOINT,
                message: e.to_string(),
            })?;
            builder = builder.endpoint(endpoint);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Create a new config with a custom region.
    pub fn with_region_id(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = region_id.into();
        self
    }

    /// Create a new config with a custom request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a new config with a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "access_key_id cannot be empty".to_string(),
            ));
        }
        if self.access_key_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "access_key_secret cannot be empty".to_string(),
            ));
        }
        if self.region_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "region_id cannot be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "connect_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidValue {
            key,
            message: e.to_string(),
        })
}

/// Builder for GatewayConfig.
#[derive(Clone)]
pub struct GatewayConfigBuilder {
    access_key_id: String,
    access_key_secret: SecretString,
    region_id: String,
    timeout: Duration,
    connect_timeout: Duration,
    endpoint: Option<Url>,
}

impl GatewayConfigBuilder {
    /// Create a new builder with default region, timeouts and endpoint.
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: SecretString::from(access_key_secret.into()),
            region_id: DEFAULT_REGION_ID.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            endpoint: None,
        }
    }

    /// Set the region id.
    ///
    /// Default: `cn-hangzhou`
    pub fn region_id(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = region_id.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Default: 6 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the RPC endpoint.
    ///
    /// Default: `https://dysmsapi.aliyuncs.com/`
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Build the GatewayConfig.
    pub fn build(self) -> GatewayConfig {
        GatewayConfig {
            access_key_id: self.access_key_id,
            access_key_secret: self.access_key_secret,
            region_id: self.region_id,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| Url::parse(DEFAULT_ENDPOINT).expect("Invalid default URL")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = GatewayConfig::builder("id", "secret").build();
        assert_eq!(config.region_id, "cn-hangzhou");
        assert_eq!(config.timeout, Duration::from_secs(6));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.endpoint.as_str(), "https://dysmsapi.aliyuncs.com/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (ENV_ACCESS_KEY_ID, "LTAI_test"),
            (ENV_ACCESS_KEY_SECRET, "s3cr3t"),
            (ENV_REGION_ID, "cn-shanghai"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_ENDPOINT, "http://localhost:8080/"),
        ]))
        .unwrap();

        assert_eq!(config.access_key_id, "LTAI_test");
        assert_eq!(config.access_key_secret.expose_secret(), "s3cr3t");
        assert_eq!(config.region_id, "cn-shanghai");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.endpoint.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_config_from_lookup_missing_secret() {
        let err = GatewayConfig::from_lookup(lookup(&[(ENV_ACCESS_KEY_ID, "id")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ENV_ACCESS_KEY_SECRET));
    }

    #[test]
    fn test_config_from_lookup_blank_is_missing() {
        let err = GatewayConfig::from_lookup(lookup(&[
            (ENV_ACCESS_KEY_ID, "  "),
            (ENV_ACCESS_KEY_SECRET, "secret"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ENV_ACCESS_KEY_ID));
    }

    #[test]
    fn test_config_from_lookup_invalid_timeout() {
        let err = GatewayConfig::from_lookup(lookup(&[
            (ENV_ACCESS_KEY_ID, "id"),
            (ENV_ACCESS_KEY_SECRET, "secret"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS,
                ..
            }
        ));
    }

    #[test]
    fn test_config_validate() {
        let config = GatewayConfig::builder("id", "secret")
            .timeout(Duration::ZERO)
            .build();
        assert!(config.validate().is_err());

        let config = GatewayConfig::builder("id", "secret").region_id("").build();
        assert!(config.validate().is_err());

        let config = GatewayConfig::builder("id", " ").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = GatewayConfig::builder("id", "very-secret").build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

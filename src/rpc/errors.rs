//! Error types for gateway and RPC operations.

use super::request::Action;
use crate::errors::{ClassifiedError, FailureSide};
use crate::gateway::ConfigError;
use std::error::Error as StdError;
use thiserror::Error;

/// Failure reported by a [`RequestSigner`](super::RequestSigner).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SignError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl SignError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Failures that happen before a provider answer is available.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to sign the request.
    #[error("Failed to sign request: {0}")]
    Sign(#[source] SignError),

    /// Failed to form-encode the request body.
    #[error("Failed to encode request body: {0}")]
    EncodeBody(#[source] serde_urlencoded::ser::Error),

    /// Failed to send HTTP request (connect, TLS, timeout...).
    #[error("Failed to send HTTP request: {0}")]
    HttpRequest(#[from] reqwest_middleware::Error),

    /// Failed to read the response body.
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("Failed to decode {action} response: {source}")]
    Decode {
        action: Action,
        #[source]
        source: serde_json::Error,
    },
}

/// Main error type for gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Local failure: the request did not produce a provider answer.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// The provider answered with a non-success HTTP status.
    #[error("Server error: HTTP {status}, code={code}, message={message}")]
    Server {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// The provider accepted the request but reported a business failure.
    #[error("Dysms API error: code={code}, message={message}")]
    Api {
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// A request parameter could not be JSON-encoded.
    #[error("Failed to encode parameter {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Gateway configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl GatewayError {
    /// Provider error code, when the provider supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } | Self::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// Provider request id, when the provider supplied one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Server { request_id, .. } | Self::Api { request_id, .. } => {
                request_id.as_deref()
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

impl ClassifiedError for GatewayError {
    fn side(&self) -> FailureSide {
        match self {
            GatewayError::Server { .. } | GatewayError::Api { .. } => FailureSide::Server,
            GatewayError::Client(_) | GatewayError::Encode { .. } | GatewayError::Config(_) => {
                FailureSide::Client
            }
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Server { status: 404, .. })
    }
}

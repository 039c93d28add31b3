//! HTTP transport for the SMS API.

use super::errors::{ClientError, GatewayError, Result};
use super::request::{API_VERSION, METHOD, RpcRequest};
use super::response::ProviderEnvelope;
use super::traits::{RequestSigner, RpcClient, SigningContext};
use crate::gateway::GatewayConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use secrecy::SecretString;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// SMS API client over HTTP.
///
/// Every call is a form-encoded POST carrying the common parameters
/// (`Action`, `Version`, `RegionId`, `AccessKeyId`, `Format`) merged with the
/// request parameters, then passed through the configured
/// [`RequestSigner`].
///
/// # Example
///
/// ```rust,ignore
/// use dysms_gateway::{GatewayConfig, HttpRpcClient, SmsGatewayClient};
///
/// let config = GatewayConfig::from_env()?;
/// let rpc = HttpRpcClient::new(&config, my_signer)?;
/// let gateway = SmsGatewayClient::from_config(&config, rpc);
/// ```
#[derive(Clone)]
pub struct HttpRpcClient {
    http_client: ClientWithMiddleware,
    endpoint: Url,
    access_key_id: String,
    access_key_secret: SecretString,
    region_id: String,
    signer: Arc<dyn RequestSigner>,
}

impl std::fmt::Debug for HttpRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpcClient")
            .field("endpoint", &self.endpoint)
            .field("region_id", &self.region_id)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`HttpRpcClient`].
pub struct HttpRpcClientBuilder {
    config: GatewayConfig,
    signer: Arc<dyn RequestSigner>,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
}

impl HttpRpcClientBuilder {
    /// Create a new builder from a gateway configuration and a signer.
    pub fn new(config: GatewayConfig, signer: impl RequestSigner + 'static) -> Self {
        Self {
            config,
            signer: Arc::new(signer),
            endpoint: None,
            http_client: None,
        }
    }

    /// Override the endpoint from the configuration.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom HTTP client with middleware.
    ///
    /// Timeouts from the configuration are not applied to a custom client.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the [`HttpRpcClient`].
    pub fn build(self) -> Result<HttpRpcClient> {
        self.config.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let client = reqwest::Client::builder()
                    .timeout(self.config.timeout)
                    .connect_timeout(self.config.connect_timeout)
                    .build()
                    .map_err(ClientError::BuildHttpClient)?;
                ClientBuilder::new(client).build()
            }
        };

        Ok(HttpRpcClient {
            http_client,
            endpoint: self.endpoint.unwrap_or(self.config.endpoint),
            access_key_id: self.config.access_key_id,
            access_key_secret: self.config.access_key_secret,
            region_id: self.config.region_id,
            signer: self.signer,
        })
    }
}

impl HttpRpcClient {
    /// Create a client from a configuration and a signer.
    pub fn new(config: &GatewayConfig, signer: impl RequestSigner + 'static) -> Result<Self> {
        Self::builder(config.clone(), signer).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(
        config: GatewayConfig,
        signer: impl RequestSigner + 'static,
    ) -> HttpRpcClientBuilder {
        HttpRpcClientBuilder::new(config, signer)
    }

    /// Get the endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Merge common parameters with the request parameters and sign them.
    fn build_form(&self, request: RpcRequest) -> Result<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        params.insert("Action".to_string(), request.action.as_str().to_string());
        params.insert("Version".to_string(), API_VERSION.to_string());
        params.insert("RegionId".to_string(), self.region_id.clone());
        params.insert("AccessKeyId".to_string(), self.access_key_id.clone());
        params.insert("Format".to_string(), "JSON".to_string());
        params.extend(request.params);

        let context = SigningContext {
            method: METHOD,
            access_key_id: &self.access_key_id,
            access_key_secret: &self.access_key_secret,
        };
        self.signer
            .sign(&context, &mut params)
            .map_err(ClientError::Sign)?;

        Ok(params)
    }
}

impl RpcClient for HttpRpcClient {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HttpRpcClient::call",
            skip_all,
            fields(action = %request.action, request_id = tracing::field::Empty)
        )
    )]
    async fn call(&self, request: RpcRequest) -> Result<Value> {
        let action = request.action;
        let params = self.build_form(request)?;
        let body = serde_urlencoded::to_string(&params).map_err(ClientError::EncodeBody)?;

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(ClientError::HttpRequest)?;

        let status = response.status();
        let text = response.text().await.map_err(ClientError::ReadBody)?;

        if !status.is_success() {
            let envelope = ProviderEnvelope::from_text_lenient(&text);

            #[cfg(feature = "tracing")]
            debug!(
                status = status.as_u16(),
                code = ?envelope.code,
                "SMS API returned non-success status"
            );

            return Err(GatewayError::Server {
                status: status.as_u16(),
                code: envelope.code.unwrap_or_else(|| status.as_str().to_string()),
                message: envelope.message.unwrap_or(text),
                request_id: envelope.request_id,
            });
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|source| ClientError::Decode { action, source })?;

        #[cfg(feature = "tracing")]
        {
            let span = Span::current();
            if let Some(request_id) = value.get("RequestId").and_then(Value::as_str) {
                span.record("request_id", request_id);
            }
            span.set_status(Status::Ok);
        }

        Ok(value)
    }
}

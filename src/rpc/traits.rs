//! Trait seams for RPC transport and request signing.

use super::errors::{GatewayError, SignError};
use super::request::RpcRequest;
use secrecy::SecretString;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Transport that executes one RPC action against the SMS API.
///
/// Implementations add the common parameters, sign the request and send
/// it. A successful HTTP exchange yields the raw JSON body; the provider's
/// business `Code` is checked by the caller.
///
/// # Example
///
/// ```rust,ignore
/// use dysms_gateway::{GatewayError, RpcClient, RpcRequest};
/// use serde_json::{Value, json};
///
/// #[derive(Clone)]
/// struct AlwaysOk;
///
/// impl RpcClient for AlwaysOk {
///     async fn call(&self, _request: RpcRequest) -> Result<Value, GatewayError> {
///         Ok(json!({ "Code": "OK", "Message": "OK", "RequestId": "local" }))
///     }
/// }
/// ```
pub trait RpcClient: Send + Sync {
    /// Execute a single request.
    fn call(
        &self,
        request: RpcRequest,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send;
}

impl<T: RpcClient> RpcClient for Arc<T> {
    fn call(
        &self,
        request: RpcRequest,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send {
        (**self).call(request)
    }
}

/// Credentials and method available to a [`RequestSigner`].
#[derive(Debug, Clone, Copy)]
pub struct SigningContext<'a> {
    /// HTTP method of the request.
    pub method: &'static str,
    /// Access key id, already present in the parameters as `AccessKeyId`.
    pub access_key_id: &'a str,
    /// Access key secret used to compute the signature.
    pub access_key_secret: &'a SecretString,
}

/// Computes request signatures.
///
/// The signer receives the complete parameter map and adds whatever its
/// scheme needs (timestamp, nonce, `Signature`...). Signing algorithms are
/// supplied by the caller.
pub trait RequestSigner: Send + Sync {
    fn sign(
        &self,
        context: &SigningContext<'_>,
        params: &mut BTreeMap<String, String>,
    ) -> Result<(), SignError>;
}

impl<F> RequestSigner for F
where
    F: Fn(&SigningContext<'_>, &mut BTreeMap<String, String>) -> Result<(), SignError>
        + Send
        + Sync,
{
    fn sign(
        &self,
        context: &SigningContext<'_>,
        params: &mut BTreeMap<String, String>,
    ) -> Result<(), SignError> {
        self(context, params)
    }
}

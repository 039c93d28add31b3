//! RPC request construction.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Product name of the SMS API.
pub const PRODUCT: &str = "Dysmsapi";

/// Fixed API version sent with every request.
pub const API_VERSION: &str = "2017-05-25";

/// HTTP method used for every action.
pub const METHOD: &str = "POST";

/// Host serving the SMS API.
pub const HOST: &str = "dysmsapi.aliyuncs.com";

/// Default RPC endpoint URL.
pub const DEFAULT_ENDPOINT: &str = "https://dysmsapi.aliyuncs.com/";

/// Remote operations exposed by the SMS API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Send one message to one or more numbers.
    SendSms,
    /// Send per-recipient signatures and parameters in one call.
    SendBatchSms,
    /// Query the send records of one number on one day.
    QuerySendDetails,
    /// Obtain a short-lived credential for the delivery-report queue.
    QueryTokenForMnsQueue,
}

impl Action {
    /// Returns the action name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendSms => "SendSms",
            Self::SendBatchSms => "SendBatchSms",
            Self::QuerySendDetails => "QuerySendDetails",
            Self::QueryTokenForMnsQueue => "QueryTokenForMnsQueue",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single RPC call: an action plus its request parameters.
///
/// Common parameters (`Version`, `AccessKeyId`, signature fields...) are
/// added by the [`RpcClient`](super::RpcClient) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    pub action: Action,
    pub params: BTreeMap<String, String>,
}

impl RpcRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            params: BTreeMap::new(),
        }
    }

    /// Set a parameter, returning the updated request.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set a parameter only when a non-empty value is given.
    pub fn param_opt<V: Into<String>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value.map(Into::into) {
            Some(value) if !value.trim().is_empty() => self.param(key, value),
            _ => self,
        }
    }

    /// Get a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

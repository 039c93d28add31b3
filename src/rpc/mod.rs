//! RPC layer: request construction, transport and response decoding.

pub(crate) mod errors;
pub(crate) mod http;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod traits;

pub use errors::{ClientError, GatewayError, SignError};
pub use http::{HttpRpcClient, HttpRpcClientBuilder};
pub use request::{API_VERSION, Action, DEFAULT_ENDPOINT, HOST, METHOD, PRODUCT, RpcRequest};
pub use response::{
    ProviderEnvelope, QuerySendDetailsResponse, QueryTokenResponse, SUCCESS_CODE,
    SendBatchSmsResponse, SendSmsResponse, SendStatus, SmsSendDetail,
};
pub use traits::{RequestSigner, RpcClient, SigningContext};

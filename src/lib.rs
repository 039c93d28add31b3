//! # Dysms Gateway
//!
//! A typed client for the Alibaba Cloud Dysms SMS API and its
//! delivery-report queue.
//!
//! The gateway sends single and batch SMS, queries send records, and polls
//! a delivery-report queue, handing every verified report to a callback.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dysms_gateway::{
//!     GatewayConfig, GatewayOutcome, HttpRpcClient, PhoneNumber, SendSms,
//!     SmsGatewayClient, TemplateParams,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from ALIYUN_ACCESS_KEY_ID / ALIYUN_ACCESS_KEY_SECRET
//!     let config = GatewayConfig::from_env()?;
//!
//!     // The request signer is supplied by the caller
//!     let rpc = HttpRpcClient::new(&config, my_signer)?;
//!     let gateway = SmsGatewayClient::from_config(&config, rpc);
//!
//!     let request = SendSms::new(PhoneNumber::new("13800138000")?, "Aliyun", "SMS_123456789")
//!         .template_params(TemplateParams::new().with("code", "1234"));
//!
//!     let outcome = GatewayOutcome::from(gateway.send_sms(request).await);
//!     println!("{} {}", outcome.code.as_i8(), outcome.message);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SmsGatewayClient<C>          DeliveryReportReceiver<C, Q>
//!         │                          │            │
//!         ▼                          ▼            ▼
//!    RpcClient (trait) ◄──── query token     QueueConnector (trait)
//!         │                                       │
//!         ▼                                       ▼
//!   HttpRpcClient ── RequestSigner (trait)   QueueSession (trait)
//! ```
//!
//! ## Features
//!
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)

pub mod errors;
pub mod gateway;
pub mod queue;
pub mod rpc;
pub mod types;

// Re-export commonly used types at the crate root
pub use errors::{ClassifiedError, FailureSide};
pub use gateway::{
    ConfigError, GatewayConfig, GatewayConfigBuilder, GatewayOutcome, OutcomeCode, SendBatchSms,
    SendSms, SmsGatewayClient,
};
pub use queue::{
    DeliveryReportReceiver, QueueConnector, QueueError, QueueMessage, QueueSession, QueueToken,
    ReceiveSummary, ReceivedReport, ReceiverConfig, ReportHandler, SmsReport, SmsUpMessage,
};
pub use rpc::{
    Action, ClientError, GatewayError, HttpRpcClient, QuerySendDetailsResponse, QueryTokenResponse,
    RequestSigner, RpcClient, RpcRequest, SendBatchSmsResponse, SendSmsResponse, SendStatus,
    SignError, SigningContext, SmsSendDetail,
};
pub use types::{
    BizId, ExtendCode, MessageType, OutId, PhoneNumber, PhoneNumberError, QueueName,
    ReceiptHandle, SignName, TemplateCode, TemplateParams,
};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;

//! Delivery-report queue: tokens, messages and the polling loop.
//!
//! The queue transport itself is supplied by the caller through
//! [`QueueConnector`] and [`QueueSession`].

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod message;
pub(crate) mod receiver;
pub(crate) mod report;
pub(crate) mod token;
pub(crate) mod traits;

/// Default endpoint of the delivery-report message queue service.
pub const DEFAULT_QUEUE_ENDPOINT: &str = "https://1943695596114318.mns.cn-hangzhou.aliyuncs.com";

pub use config::{MAX_BATCH_SIZE, ReceiverConfig, ReceiverConfigBuilder};
pub use error::QueueError;
pub use message::{QueueMessage, ReceivedReport, body_checksum};
pub use receiver::{DeliveryReportReceiver, ReceiveSummary};
pub use report::{SmsReport, SmsUpMessage};
pub use token::{DEFAULT_REFRESH_WINDOW, QueueToken, parse_expire_time};
pub use traits::{QueueConnector, QueueSession, ReportHandler};

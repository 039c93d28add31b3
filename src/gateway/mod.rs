//! SMS gateway: typed operations over an injected RPC client.

pub(crate) mod client;
pub(crate) mod config;
pub(crate) mod outcome;
pub(crate) mod requests;

pub use client::SmsGatewayClient;
pub use config::{
    ConfigError, DEFAULT_REGION_ID, ENV_ACCESS_KEY_ID, ENV_ACCESS_KEY_SECRET,
    ENV_CONNECT_TIMEOUT_SECS, ENV_ENDPOINT, ENV_REGION_ID, ENV_TIMEOUT_SECS, GatewayConfig,
    GatewayConfigBuilder,
};
pub use outcome::{GatewayOutcome, OutcomeCode};
pub use requests::{QUERY_CURRENT_PAGE, QUERY_PAGE_SIZE, SendBatchSms, SendSms};

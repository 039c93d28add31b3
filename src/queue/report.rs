//! Payloads carried by delivery-report queues.

use serde::{Deserialize, Serialize};

/// Delivery receipt (`SmsReport` message type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsReport {
    pub phone_number: String,
    #[serde(default)]
    pub send_time: Option<String>,
    #[serde(default)]
    pub report_time: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub err_code: Option<String>,
    #[serde(default)]
    pub err_msg: Option<String>,
    /// Number of billed segments, sent as a string.
    #[serde(default)]
    pub sms_size: Option<String>,
    #[serde(default)]
    pub biz_id: Option<String>,
    #[serde(default)]
    pub out_id: Option<String>,
}

/// Reply sent by a recipient (`SmsUp` message type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsUpMessage {
    pub phone_number: String,
    #[serde(default)]
    pub send_time: Option<String>,
    pub content: String,
    #[serde(default)]
    pub sign_name: Option<String>,
    #[serde(default)]
    pub dest_code: Option<String>,
    #[serde(default)]
    pub sequence_id: Option<i64>,
}

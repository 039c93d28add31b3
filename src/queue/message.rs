//! Raw queue messages and checksum verification.

use crate::types::{MessageType, ReceiptHandle};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;

/// Upper-case hex MD5 of `bytes`, the checksum format the queue uses.
///
/// ```rust
/// use dysms_gateway::queue::body_checksum;
///
/// assert_eq!(body_checksum(b"hello"), "5D41402ABC4B2A76B9719D911017C592");
/// ```
pub fn body_checksum(bytes: &[u8]) -> String {
    format!("{:X}", md5::compute(bytes))
}

/// A message as pulled from the delivery-report queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Base64 encoded body, as received.
    pub body: String,
    /// Checksum of the decoded body.
    pub body_md5: String,
    /// Handle used to delete the message once processed.
    pub receipt_handle: ReceiptHandle,
}

impl QueueMessage {
    pub fn new(
        body: impl Into<String>,
        body_md5: impl Into<String>,
        receipt_handle: impl Into<ReceiptHandle>,
    ) -> Self {
        Self {
            body: body.into(),
            body_md5: body_md5.into(),
            receipt_handle: receipt_handle.into(),
        }
    }

    /// Build a well-formed message around a decoded body.
    pub fn from_body(decoded: &str, receipt_handle: impl Into<ReceiptHandle>) -> Self {
        Self::new(
            STANDARD.encode(decoded),
            body_checksum(decoded.as_bytes()),
            receipt_handle,
        )
    }

    /// Decode the body and check it against `body_md5`.
    ///
    /// Returns `None` when the body is not valid base64 or UTF-8, or when the
    /// checksum does not match.
    pub fn decode_verified(&self) -> Option<String> {
        let bytes = STANDARD.decode(self.body.trim()).ok()?;
        if !body_checksum(&bytes).eq_ignore_ascii_case(self.body_md5.trim()) {
            return None;
        }
        String::from_utf8(bytes).ok()
    }
}

/// A verified report handed to a [`ReportHandler`](super::ReportHandler).
#[derive(Debug, Clone, Copy)]
pub struct ReceivedReport<'a> {
    pub message_type: &'a MessageType,
    /// Decoded message body, usually a JSON object.
    pub body: &'a str,
    pub receipt_handle: &'a ReceiptHandle,
}

impl ReceivedReport<'_> {
    /// Parse the body, e.g. into [`SmsReport`](super::SmsReport).
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_verifies() {
        let message = QueueMessage::from_body(r#"{"success":true}"#, "rh-1");
        assert_eq!(message.decode_verified().as_deref(), Some(r#"{"success":true}"#));
    }

    #[test]
    fn test_checksum_is_case_insensitive() {
        let mut message = QueueMessage::from_body("report", "rh-1");
        message.body_md5 = message.body_md5.to_lowercase();
        assert_eq!(message.decode_verified().as_deref(), Some("report"));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut message = QueueMessage::from_body("report", "rh-1");
        message.body_md5 = body_checksum(b"other");
        assert!(message.decode_verified().is_none());
    }

    #[test]
    fn test_invalid_base64() {
        let message = QueueMessage::new("not base64!!", body_checksum(b""), "rh-1");
        assert!(message.decode_verified().is_none());
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0xff, 0xfe, 0xfd];
        let message = QueueMessage::new(STANDARD.encode(bytes), body_checksum(&bytes), "rh-1");
        assert!(message.decode_verified().is_none());
    }

    #[test]
    fn test_received_report_parse() {
        let message_type = MessageType::SmsReport;
        let handle = ReceiptHandle::from("rh-1");
        let report = ReceivedReport {
            message_type: &message_type,
            body: r#"{"phone_number":"13800138000"}"#,
            receipt_handle: &handle,
        };

        let value: serde_json::Value = report.parse().unwrap();
        assert_eq!(value["phone_number"], "13800138000");
    }
}

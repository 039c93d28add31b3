//! Response parsing for the SMS API.

use super::errors::{ClientError, GatewayError, Result};
use super::request::Action;
use crate::queue::QueueToken;
use crate::types::{BizId, OutId, TemplateCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;

/// Business code the provider returns on success.
pub const SUCCESS_CODE: &str = "OK";

/// Common fields present on every provider answer, success or failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderEnvelope {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
}

impl ProviderEnvelope {
    /// Parse the envelope from a raw body, falling back to an empty one.
    pub fn from_text_lenient(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// Returns true if the business code is absent or `OK`.
    pub fn is_success(&self) -> bool {
        self.code.as_deref().is_none_or(|code| code == SUCCESS_CODE)
    }
}

/// Check the business code of a raw answer and decode it into `T`.
///
/// A present `Code` other than `OK` becomes [`GatewayError::Api`].
pub(crate) fn decode_response<T: DeserializeOwned>(action: Action, value: Value) -> Result<T> {
    let envelope = ProviderEnvelope::deserialize(&value)
        .map_err(|source| ClientError::Decode { action, source })?;

    if !envelope.is_success() {
        return Err(GatewayError::Api {
            code: envelope.code.unwrap_or_default(),
            message: envelope.message.unwrap_or_default(),
            request_id: envelope.request_id,
        });
    }

    serde_json::from_value(value).map_err(|source| ClientError::Decode { action, source }.into())
}

/// Response from the SendSms action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendSmsResponse {
    pub request_id: String,
    pub code: String,
    #[serde(default)]
    pub message: String,
    /// Send receipt id; pass it to `query_send_details` to narrow the query.
    pub biz_id: Option<BizId>,
}

/// Response from the SendBatchSms action.
pub type SendBatchSmsResponse = SendSmsResponse;

/// Delivery state of a send record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Waiting for a receipt from the carrier.
    Waiting,
    /// Delivery failed.
    Failed,
    /// Delivered to the handset.
    Delivered,
    /// Status code not known to this crate.
    Unknown(i64),
}

impl SendStatus {
    /// Map the numeric provider status.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Waiting,
            2 => Self::Failed,
            3 => Self::Delivered,
            other => Self::Unknown(other),
        }
    }

    /// Get the numeric provider status.
    pub fn code(&self) -> i64 {
        match self {
            Self::Waiting => 1,
            Self::Failed => 2,
            Self::Delivered => 3,
            Self::Unknown(code) => *code,
        }
    }
}

impl Serialize for SendStatus {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for SendStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::from_code(deserialize_flexible_i64(d)?))
    }
}

/// One send record returned by QuerySendDetails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmsSendDetail {
    pub phone_num: String,
    pub send_status: SendStatus,
    /// Carrier status (e.g., "DELIVERED").
    #[serde(default)]
    pub err_code: Option<String>,
    pub template_code: Option<TemplateCode>,
    #[serde(default)]
    pub content: Option<String>,
    pub send_date: Option<String>,
    #[serde(default)]
    pub receive_date: Option<String>,
    #[serde(default)]
    pub out_id: Option<OutId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SmsSendDetailList {
    #[serde(rename = "SmsSendDetailDTO", default)]
    items: Vec<SmsSendDetail>,
}

/// Response from the QuerySendDetails action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySendDetailsResponse {
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(
        rename = "TotalCount",
        default,
        deserialize_with = "deserialize_flexible_u64"
    )]
    pub total_count: u64,
    #[serde(
        rename = "SmsSendDetailDTOs",
        default,
        deserialize_with = "deserialize_detail_list"
    )]
    pub details: Vec<SmsSendDetail>,
}

/// Response from the QueryTokenForMnsQueue action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryTokenResponse {
    pub request_id: String,
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "MessageTokenDTO")]
    pub message_token: QueueToken,
}

fn deserialize_detail_list<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<SmsSendDetail>, D::Error> {
    let list = Option::<SmsSendDetailList>::deserialize(d)?;
    Ok(list.map(|list| list.items).unwrap_or_default())
}

/// Accept a count either as a JSON number or as a numeric string.
fn deserialize_flexible_i64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("expected integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected integer, got '{s}'"))),
        other => Err(de::Error::custom(format!("expected integer, got {other}"))),
    }
}

fn deserialize_flexible_u64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    let n = deserialize_flexible_i64(d)?;
    u64::try_from(n).map_err(|_| de::Error::custom(format!("expected non-negative count, got {n}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_sms_response_success() {
        let value = json!({
            "Message": "OK",
            "RequestId": "F655A8D5-B967-440B-8683-DAD6FF8DE990",
            "BizId": "900619746936498440^0",
            "Code": "OK"
        });

        let response: SendSmsResponse = decode_response(Action::SendSms, value).unwrap();
        assert_eq!(response.code, "OK");
        assert_eq!(
            response.biz_id.as_ref().map(BizId::as_str),
            Some("900619746936498440^0")
        );
    }

    #[test]
    fn test_business_failure_becomes_api_error() {
        let value = json!({
            "Message": "触发分钟级流控Permits:1",
            "RequestId": "req-2",
            "Code": "isv.BUSINESS_LIMIT_CONTROL"
        });

        let err = decode_response::<SendSmsResponse>(Action::SendSms, value).unwrap_err();
        match err {
            GatewayError::Api {
                code, request_id, ..
            } => {
                assert_eq!(code, "isv.BUSINESS_LIMIT_CONTROL");
                assert_eq!(request_id.as_deref(), Some("req-2"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_shape_is_decode_error() {
        let value = json!({ "Code": "OK" });
        let err = decode_response::<SendSmsResponse>(Action::SendSms, value).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Client(ClientError::Decode {
                action: Action::SendSms,
                ..
            })
        ));
    }

    #[test]
    fn test_query_send_details_response() {
        let value = json!({
            "TotalCount": "1",
            "Message": "OK",
            "RequestId": "req-3",
            "SmsSendDetailDTOs": {
                "SmsSendDetailDTO": [{
                    "SendDate": "2019-01-08 16:44:10",
                    "SendStatus": 3,
                    "ReceiveDate": "2019-01-08 16:44:13",
                    "ErrCode": "DELIVERED",
                    "TemplateCode": "SMS_122310183",
                    "Content": "【阿里云】验证码为：123",
                    "PhoneNum": "15298356881",
                    "OutId": "abc"
                }]
            },
            "Code": "OK"
        });

        let response: QuerySendDetailsResponse =
            decode_response(Action::QuerySendDetails, value).unwrap();
        assert_eq!(response.total_count, 1);
        assert_eq!(response.details.len(), 1);
        let detail = &response.details[0];
        assert_eq!(detail.send_status, SendStatus::Delivered);
        assert_eq!(detail.err_code.as_deref(), Some("DELIVERED"));
        assert_eq!(detail.out_id.as_ref().map(OutId::as_str), Some("abc"));
    }

    #[test]
    fn test_query_send_details_without_records() {
        let value = json!({
            "TotalCount": 0,
            "Message": "OK",
            "RequestId": "req-4",
            "Code": "OK"
        });

        let response: QuerySendDetailsResponse =
            decode_response(Action::QuerySendDetails, value).unwrap();
        assert_eq!(response.total_count, 0);
        assert!(response.details.is_empty());
    }

    #[test]
    fn test_send_status_codes() {
        assert_eq!(SendStatus::from_code(1), SendStatus::Waiting);
        assert_eq!(SendStatus::from_code(2), SendStatus::Failed);
        assert_eq!(SendStatus::from_code(9), SendStatus::Unknown(9));
        assert_eq!(SendStatus::Unknown(9).code(), 9);
    }

    #[test]
    fn test_envelope_lenient_parse() {
        let envelope = ProviderEnvelope::from_text_lenient("<html>bad gateway</html>");
        assert_eq!(envelope, ProviderEnvelope::default());
        assert!(envelope.is_success());

        let envelope = ProviderEnvelope::from_text_lenient(
            r#"{"Code":"InvalidAccessKeyId.NotFound","Message":"Specified access key is not found.","RequestId":"r"}"#,
        );
        assert!(!envelope.is_success());
        assert_eq!(envelope.request_id.as_deref(), Some("r"));
    }
}

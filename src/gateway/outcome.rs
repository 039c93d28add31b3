//! Uniform `{code, message, data}` result envelope.

use crate::rpc::GatewayError;
use serde::Serialize;
use serde_json::Value;

/// Outcome code of a gateway call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "i8")]
pub enum OutcomeCode {
    /// No call has completed yet.
    #[default]
    Uninitialized,
    /// The call succeeded.
    Success,
    /// The call failed.
    Failure,
}

impl OutcomeCode {
    /// Numeric value: 1 for success, -1 for failure, 0 before a call.
    pub fn as_i8(&self) -> i8 {
        match self {
            Self::Uninitialized => 0,
            Self::Success => 1,
            Self::Failure => -1,
        }
    }
}

impl From<OutcomeCode> for i8 {
    fn from(code: OutcomeCode) -> Self {
        code.as_i8()
    }
}

/// Normalized result of a gateway call.
///
/// Built from the typed `Result` of any gateway operation:
///
/// ```rust
/// use dysms_gateway::{GatewayError, GatewayOutcome, OutcomeCode};
///
/// let ok: Result<u32, GatewayError> = Ok(7);
/// let outcome = GatewayOutcome::from(ok);
/// assert_eq!(outcome.code, OutcomeCode::Success);
/// assert_eq!(outcome.data, Some(serde_json::json!(7)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GatewayOutcome {
    pub code: OutcomeCode,
    pub message: String,
    pub data: Option<Value>,
}

impl GatewayOutcome {
    pub fn is_success(&self) -> bool {
        self.code == OutcomeCode::Success
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            code: OutcomeCode::Failure,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> From<Result<T, GatewayError>> for GatewayOutcome {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(payload) => match serde_json::to_value(&payload) {
                Ok(data) => Self {
                    code: OutcomeCode::Success,
                    message: "success".to_string(),
                    data: Some(data),
                },
                Err(e) => Self::failure(format!("Failed to serialize response: {e}")),
            },
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::SendSmsResponse;

    #[test]
    fn test_default_is_uninitialized() {
        let outcome = GatewayOutcome::default();
        assert_eq!(outcome.code.as_i8(), 0);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_success_outcome() {
        let response = SendSmsResponse {
            request_id: "req-1".to_string(),
            code: "OK".to_string(),
            message: "OK".to_string(),
            biz_id: Some("biz-1".into()),
        };
        let outcome = GatewayOutcome::from(Ok::<_, GatewayError>(response));

        assert_eq!(outcome.code.as_i8(), 1);
        assert_eq!(outcome.message, "success");
        assert_eq!(outcome.data.unwrap()["BizId"], "biz-1");
    }

    #[test]
    fn test_failure_outcome() {
        let err = GatewayError::Api {
            code: "isv.MOBILE_NUMBER_ILLEGAL".to_string(),
            message: "illegal number".to_string(),
            request_id: None,
        };
        let outcome = GatewayOutcome::from(Err::<SendSmsResponse, _>(err));

        assert_eq!(outcome.code.as_i8(), -1);
        assert!(outcome.message.contains("isv.MOBILE_NUMBER_ILLEGAL"));
        assert!(outcome.data.is_none());
    }

    #[test]
    fn test_outcome_serializes_numeric_code() {
        let outcome = GatewayOutcome::from(Ok::<_, GatewayError>("done"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["code"], 1);
        assert_eq!(json["data"], "done");
    }
}

//! Request types for the gateway operations.

use crate::rpc::{Action, GatewayError, RpcRequest};
use crate::types::{
    BizId, ExtendCode, MessageType, OutId, PhoneNumber, QueueName, SignName, TemplateCode,
    TemplateParams,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Page size used by send detail queries.
pub const QUERY_PAGE_SIZE: u32 = 10;
/// Page requested by send detail queries.
pub const QUERY_CURRENT_PAGE: u32 = 1;

/// Encode a list or map as compact JSON.
fn encode_json<T: Serialize + ?Sized>(field: &'static str, value: &T) -> Result<String, GatewayError> {
    serde_json::to_string(value).map_err(|source| GatewayError::Encode { field, source })
}

/// A single SMS, one template rendered once for every recipient.
///
/// # Example
///
/// ```rust
/// use dysms_gateway::{PhoneNumber, SendSms, TemplateParams};
///
/// let request = SendSms::new(
///     PhoneNumber::new("13800138000").unwrap(),
///     "Aliyun",
///     "SMS_123456789",
/// )
/// .template_params(TemplateParams::new().with("code", "1234"))
/// .out_id("order-42");
///
/// assert_eq!(request.phones().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendSms {
    phones: Vec<PhoneNumber>,
    sign_name: SignName,
    template_code: TemplateCode,
    template_params: TemplateParams,
    out_id: Option<OutId>,
    extend_code: Option<ExtendCode>,
}

impl SendSms {
    /// Create a request for one recipient.
    pub fn new(
        phone: PhoneNumber,
        sign_name: impl Into<SignName>,
        template_code: impl Into<TemplateCode>,
    ) -> Self {
        Self {
            phones: vec![phone],
            sign_name: sign_name.into(),
            template_code: template_code.into(),
            template_params: TemplateParams::new(),
            out_id: None,
            extend_code: None,
        }
    }

    /// Add another recipient receiving the same message.
    pub fn recipient(mut self, phone: PhoneNumber) -> Self {
        self.phones.push(phone);
        self
    }

    /// Set the template variables.
    pub fn template_params(mut self, params: TemplateParams) -> Self {
        self.template_params = params;
        self
    }

    /// Set the caller-defined correlation id.
    pub fn out_id(mut self, out_id: impl Into<OutId>) -> Self {
        self.out_id = Some(out_id.into());
        self
    }

    /// Set the upstream extension code.
    pub fn extend_code(mut self, extend_code: impl Into<ExtendCode>) -> Self {
        self.extend_code = Some(extend_code.into());
        self
    }

    pub fn phones(&self) -> &[PhoneNumber] {
        &self.phones
    }

    pub(crate) fn into_rpc_request(self) -> Result<RpcRequest, GatewayError> {
        let phones = self
            .phones
            .iter()
            .map(PhoneNumber::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let template_param = if self.template_params.is_empty() {
            None
        } else {
            Some(encode_json("TemplateParam", &self.template_params)?)
        };

        Ok(RpcRequest::new(Action::SendSms)
            .param("PhoneNumbers", phones)
            .param("SignName", self.sign_name.as_str())
            .param("TemplateCode", self.template_code.as_str())
            .param_opt("TemplateParam", template_param)
            .param_opt("OutId", self.out_id.map(|v| v.as_str().to_string()))
            .param_opt(
                "SmsUpExtendCode",
                self.extend_code.map(|v| v.as_str().to_string()),
            ))
    }
}

/// A batch SMS: per-recipient signature and template variables.
///
/// The lists are positional: entry `i` of each list belongs to phone `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendBatchSms {
    phones: Vec<PhoneNumber>,
    sign_names: Vec<SignName>,
    template_code: TemplateCode,
    template_params: Vec<TemplateParams>,
    extend_codes: Option<Vec<ExtendCode>>,
}

impl SendBatchSms {
    pub fn new(
        phones: Vec<PhoneNumber>,
        sign_names: Vec<SignName>,
        template_code: impl Into<TemplateCode>,
        template_params: Vec<TemplateParams>,
    ) -> Self {
        Self {
            phones,
            sign_names,
            template_code: template_code.into(),
            template_params,
            extend_codes: None,
        }
    }

    /// Set per-recipient upstream extension codes.
    pub fn extend_codes(mut self, extend_codes: Vec<ExtendCode>) -> Self {
        self.extend_codes = Some(extend_codes);
        self
    }

    pub(crate) fn into_rpc_request(self) -> Result<RpcRequest, GatewayError> {
        let phones = if self.phones.is_empty() {
            None
        } else {
            Some(encode_json("PhoneNumberJson", &self.phones)?)
        };
        let sign_names = if self.sign_names.is_empty() {
            None
        } else {
            Some(encode_json("SignNameJson", &self.sign_names)?)
        };
        let template_params = if self.template_params.is_empty() {
            None
        } else {
            Some(encode_json("TemplateParamJson", &self.template_params)?)
        };
        let extend_codes = match self.extend_codes {
            Some(codes) if !codes.is_empty() => Some(encode_json("SmsUpExtendCodeJson", &codes)?),
            _ => None,
        };

        Ok(RpcRequest::new(Action::SendBatchSms)
            .param_opt("PhoneNumberJson", phones)
            .param_opt("SignNameJson", sign_names)
            .param("TemplateCode", self.template_code.as_str())
            .param_opt("TemplateParamJson", template_params)
            .param_opt("SmsUpExtendCodeJson", extend_codes))
    }
}

/// Build the QuerySendDetails request for one number on one day.
pub(crate) fn query_send_details_request(
    phone: &PhoneNumber,
    date: NaiveDate,
    biz_id: Option<&BizId>,
) -> RpcRequest {
    RpcRequest::new(Action::QuerySendDetails)
        .param("PhoneNumber", phone.as_str())
        .param("SendDate", date.format("%Y%m%d").to_string())
        .param("PageSize", QUERY_PAGE_SIZE.to_string())
        .param("CurrentPage", QUERY_CURRENT_PAGE.to_string())
        .param_opt("BizId", biz_id.map(BizId::as_str))
}

/// Build the QueryTokenForMnsQueue request.
pub(crate) fn query_queue_token_request(
    message_type: &MessageType,
    queue_name: &QueueName,
) -> RpcRequest {
    RpcRequest::new(Action::QueryTokenForMnsQueue)
        .param("MessageType", message_type.as_str())
        .param("QueueName", queue_name.as_str())
}

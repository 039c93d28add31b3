//! Main gateway implementation.

use super::config::GatewayConfig;
use super::requests::{SendBatchSms, SendSms, query_queue_token_request, query_send_details_request};
use crate::queue::{
    DeliveryReportReceiver, QueueConnector, ReceiveSummary, ReceiverConfig, ReportHandler,
};
use crate::rpc::response::decode_response;
use crate::rpc::{
    Action, GatewayError, QuerySendDetailsResponse, QueryTokenResponse, RpcClient, RpcRequest,
    SendBatchSmsResponse, SendSmsResponse,
};
use crate::types::{BizId, MessageType, PhoneNumber, QueueName};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{debug, error};

/// SMS gateway over any [`RpcClient`].
///
/// Translates high-level calls into provider RPC actions, decodes the
/// answers into typed responses and logs every failure before returning it.
/// The RPC client is injected per instance; there is no process-wide
/// default client.
///
/// # Type Parameters
///
/// - `C`: The RPC transport (e.g., [`HttpRpcClient`](crate::HttpRpcClient))
///
/// # Example
///
/// ```rust,ignore
/// use dysms_gateway::{GatewayConfig, GatewayOutcome, HttpRpcClient, PhoneNumber, SendSms, SmsGatewayClient};
///
/// let config = GatewayConfig::from_env()?;
/// let gateway = SmsGatewayClient::from_config(&config, HttpRpcClient::new(&config, signer)?);
///
/// let request = SendSms::new(PhoneNumber::new("13800138000")?, "Aliyun", "SMS_123456789");
/// let response = gateway.send_sms(request).await?;
/// println!("BizId: {:?}", response.biz_id);
///
/// // Or as the uniform envelope
/// let outcome = GatewayOutcome::from(gateway.send_sms(other_request).await);
/// ```
#[derive(Debug, Clone)]
pub struct SmsGatewayClient<C: RpcClient> {
    rpc: C,
    region_id: String,
}

impl<C: RpcClient> SmsGatewayClient<C> {
    /// Create a gateway that sends `RegionId = region_id` with every action.
    pub fn new(rpc: C, region_id: impl Into<String>) -> Self {
        Self {
            rpc,
            region_id: region_id.into(),
        }
    }

    /// Create a gateway using the region of a configuration.
    pub fn from_config(config: &GatewayConfig, rpc: C) -> Self {
        Self::new(rpc, config.region_id.clone())
    }

    /// Get reference to the underlying RPC client.
    pub fn rpc(&self) -> &C {
        &self.rpc
    }

    /// Get the region sent with every action.
    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    /// Issue one action and decode its answer, logging failures.
    async fn execute<T: DeserializeOwned>(&self, request: RpcRequest) -> Result<T, GatewayError> {
        let action = request.action;
        let request = request.param("RegionId", self.region_id.as_str());

        let result = match self.rpc.call(request).await {
            Ok(value) => decode_response::<T>(action, value),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => {
                #[cfg(feature = "tracing")]
                debug!(action = %action, "SMS API call succeeded");
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                error!(
                    action = %action,
                    error = %_e,
                    code = ?_e.code(),
                    request_id = ?_e.request_id(),
                    "SMS API call failed"
                );
            }
        }

        result
    }

    /// Send one message to one or more recipients.
    ///
    /// `TemplateParam`, `OutId` and `SmsUpExtendCode` are only sent when
    /// non-empty.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_gateway.send_sms", skip_all)
    )]
    pub async fn send_sms(&self, request: SendSms) -> Result<SendSmsResponse, GatewayError> {
        let request = self.prepare(Action::SendSms, request.into_rpc_request())?;
        self.execute(request).await
    }

    /// Send per-recipient signatures and template variables in one call.
    ///
    /// Each list is JSON-encoded only when non-empty; empty lists are left
    /// out of the request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_gateway.send_batch_sms", skip_all)
    )]
    pub async fn send_batch_sms(
        &self,
        request: SendBatchSms,
    ) -> Result<SendBatchSmsResponse, GatewayError> {
        let request = self.prepare(Action::SendBatchSms, request.into_rpc_request())?;
        self.execute(request).await
    }

    /// Query send records of one number on one day.
    ///
    /// Returns the first page of at most ten records.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_gateway.query_send_details",
            skip_all,
            fields(date = %date)
        )
    )]
    pub async fn query_send_details(
        &self,
        phone: &PhoneNumber,
        date: NaiveDate,
        biz_id: Option<&BizId>,
    ) -> Result<QuerySendDetailsResponse, GatewayError> {
        self.execute(query_send_details_request(phone, date, biz_id))
            .await
    }

    /// Obtain a short-lived credential for a delivery-report queue.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_gateway.query_queue_token",
            skip_all,
            fields(message_type = %message_type, queue = %queue_name)
        )
    )]
    pub async fn query_queue_token(
        &self,
        message_type: &MessageType,
        queue_name: &QueueName,
    ) -> Result<QueryTokenResponse, GatewayError> {
        self.execute(query_queue_token_request(message_type, queue_name))
            .await
    }

    /// Poll a delivery-report queue until it reports "not found" three times.
    ///
    /// Uses the default [`ReceiverConfig`]. See [`DeliveryReportReceiver`]
    /// for the loop semantics. Never fails; the summary tells what happened.
    pub async fn receive_delivery_reports<Q, H>(
        &self,
        connector: &Q,
        message_type: MessageType,
        queue_name: QueueName,
        handler: H,
    ) -> ReceiveSummary
    where
        Q: QueueConnector,
        H: ReportHandler,
    {
        DeliveryReportReceiver::new(self, connector, ReceiverConfig::default())
            .run(&message_type, &queue_name, handler)
            .await
    }

    /// Same as [`receive_delivery_reports`](Self::receive_delivery_reports),
    /// also stopping when `cancel_token` is cancelled.
    pub async fn receive_delivery_reports_cancellable<Q, H>(
        &self,
        connector: &Q,
        message_type: MessageType,
        queue_name: QueueName,
        handler: H,
        cancel_token: CancellationToken,
    ) -> ReceiveSummary
    where
        Q: QueueConnector,
        H: ReportHandler,
    {
        DeliveryReportReceiver::new(self, connector, ReceiverConfig::default())
            .run_cancellable(&message_type, &queue_name, handler, cancel_token)
            .await
    }

    /// Log request-building failures the same way call failures are logged.
    fn prepare(
        &self,
        action: Action,
        request: Result<RpcRequest, GatewayError>,
    ) -> Result<RpcRequest, GatewayError> {
        request.inspect_err(|_e| {
            #[cfg(feature = "tracing")]
            error!(action = %action, error = %_e, "Failed to build SMS API request");
            #[cfg(not(feature = "tracing"))]
            let _ = action;
        })
    }
}

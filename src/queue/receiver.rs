//! Delivery-report polling loop.

use super::config::ReceiverConfig;
use super::error::QueueError;
use super::message::ReceivedReport;
use super::token::QueueToken;
use super::traits::{QueueConnector, QueueSession, ReportHandler};
use crate::errors::{ClassifiedError, FailureSide};
use crate::gateway::SmsGatewayClient;
use crate::rpc::{GatewayError, RpcClient};
use crate::types::{MessageType, QueueName};
use chrono::Utc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info, warn};

/// What a polling loop did before it returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveSummary {
    /// Loop iterations started.
    pub polls: u64,
    /// Messages pulled from the queue, including corrupted ones.
    pub received: u64,
    /// Verified reports passed to the handler.
    pub handled: u64,
    /// Messages deleted after the handler accepted them.
    pub deleted: u64,
    /// Messages skipped for an undecodable body or checksum mismatch.
    pub corrupted: u64,
    /// Queue tokens fetched.
    pub token_refreshes: u64,
    /// Not-found failures counted towards the stop condition.
    pub not_found_failures: u32,
    /// Other failures, logged and ignored.
    pub other_failures: u64,
    /// True if the loop stopped on cancellation.
    pub cancelled: bool,
}

/// Failure of one loop iteration.
#[derive(Debug, Error)]
enum PollError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl ClassifiedError for PollError {
    fn side(&self) -> FailureSide {
        match self {
            Self::Gateway(e) => e.side(),
            Self::Queue(e) => e.side(),
        }
    }

    fn is_not_found(&self) -> bool {
        match self {
            Self::Gateway(e) => e.is_not_found(),
            Self::Queue(e) => e.is_not_found(),
        }
    }
}

/// Pulls delivery reports from a queue and hands them to a callback.
///
/// Each iteration:
///
/// 1. fetches a queue token through the gateway unless the cached one has
///    more than `refresh_window` of validity left;
/// 2. opens a session and batch-receives up to `max_messages`;
/// 3. skips messages failing checksum verification (no callback, no delete);
/// 4. passes the rest to the handler and batch-deletes the accepted ones.
///
/// Failures are logged. Those classified as not found are counted and the
/// loop returns once `max_not_found` of them have occurred; the counter is
/// never reset. All other failures are ignored.
///
/// # Example
///
/// ```rust,ignore
/// use dysms_gateway::queue::{DeliveryReportReceiver, ReceiverConfig, SmsReport};
/// use dysms_gateway::{MessageType, QueueName};
///
/// let receiver = DeliveryReportReceiver::new(&gateway, &connector, ReceiverConfig::default());
/// let summary = receiver
///     .run(&MessageType::SmsReport, &QueueName::from("Alicom-Queue-1-SmsReport"), |report: &_| {
///         report.parse::<SmsReport>().is_ok()
///     })
///     .await;
/// println!("deleted {} reports", summary.deleted);
/// ```
#[derive(Debug)]
pub struct DeliveryReportReceiver<'a, C: RpcClient, Q: QueueConnector> {
    gateway: &'a SmsGatewayClient<C>,
    connector: &'a Q,
    config: ReceiverConfig,
}

impl<'a, C: RpcClient, Q: QueueConnector> DeliveryReportReceiver<'a, C, Q> {
    pub fn new(gateway: &'a SmsGatewayClient<C>, connector: &'a Q, config: ReceiverConfig) -> Self {
        Self {
            gateway,
            connector,
            config,
        }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Poll until the not-found limit is reached.
    pub async fn run<H: ReportHandler>(
        &self,
        message_type: &MessageType,
        queue_name: &QueueName,
        handler: H,
    ) -> ReceiveSummary {
        self.run_cancellable(message_type, queue_name, handler, CancellationToken::new())
            .await
    }

    /// Poll until the not-found limit is reached or `cancel_token` is
    /// cancelled.
    ///
    /// Cancellation interrupts an in-flight iteration; messages of that
    /// iteration that were not yet deleted will be delivered again.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "delivery_reports.receive",
            skip_all,
            fields(message_type = %message_type, queue = %queue_name)
        )
    )]
    pub async fn run_cancellable<H: ReportHandler>(
        &self,
        message_type: &MessageType,
        queue_name: &QueueName,
        mut handler: H,
        cancel_token: CancellationToken,
    ) -> ReceiveSummary {
        let mut summary = ReceiveSummary::default();

        if let Err(_e) = self.config.validate() {
            #[cfg(feature = "tracing")]
            error!(error = %_e, "Invalid receiver configuration");
            return summary;
        }

        let mut token: Option<QueueToken> = None;

        #[cfg(feature = "tracing")]
        debug!(
            max_messages = self.config.max_messages,
            wait_seconds = self.config.wait_seconds,
            "Starting delivery report polling"
        );

        while summary.not_found_failures < self.config.max_not_found {
            let step = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => None,
                result = self.poll_once(
                    message_type,
                    queue_name,
                    &mut token,
                    &mut handler,
                    &mut summary,
                ) => Some(result),
            };

            let Some(result) = step else {
                summary.cancelled = true;
                #[cfg(feature = "tracing")]
                info!(polls = summary.polls, "Delivery report polling cancelled");
                break;
            };

            let Err(e) = result else {
                continue;
            };

            if e.is_not_found() {
                summary.not_found_failures += 1;
                #[cfg(feature = "tracing")]
                warn!(
                    error = %e,
                    attempt = summary.not_found_failures,
                    max_attempts = self.config.max_not_found,
                    "Queue reported not found"
                );
            } else {
                summary.other_failures += 1;
                #[cfg(feature = "tracing")]
                error!(error = %e, "Delivery report poll failed, continuing");
            }

            if summary.not_found_failures < self.config.max_not_found
                && !self.config.error_delay.is_zero()
            {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {}
                    _ = tokio::time::sleep(self.config.error_delay) => {}
                }
            }
        }

        #[cfg(feature = "tracing")]
        info!(
            polls = summary.polls,
            handled = summary.handled,
            deleted = summary.deleted,
            corrupted = summary.corrupted,
            cancelled = summary.cancelled,
            "Delivery report polling finished"
        );

        summary
    }

    async fn poll_once<H: ReportHandler>(
        &self,
        message_type: &MessageType,
        queue_name: &QueueName,
        cached_token: &mut Option<QueueToken>,
        handler: &mut H,
        summary: &mut ReceiveSummary,
    ) -> Result<(), PollError> {
        summary.polls += 1;

        let token = self
            .current_token(message_type, queue_name, cached_token, summary)
            .await?;
        let session = self.connector.open(token).await?;

        let messages = session
            .batch_receive(queue_name, self.config.max_messages, self.config.wait_seconds)
            .await?;
        summary.received += messages.len() as u64;

        let mut accepted = Vec::new();
        for message in &messages {
            let Some(body) = message.decode_verified() else {
                summary.corrupted += 1;
                #[cfg(feature = "tracing")]
                warn!(
                    receipt_handle = %message.receipt_handle,
                    "Skipping message with invalid body or checksum"
                );
                continue;
            };

            let report = ReceivedReport {
                message_type,
                body: &body,
                receipt_handle: &message.receipt_handle,
            };
            summary.handled += 1;
            if handler.handle(&report) {
                accepted.push(message.receipt_handle.clone());
            }
        }

        if !accepted.is_empty() {
            let count = accepted.len() as u64;
            session.batch_delete(queue_name, accepted).await?;
            summary.deleted += count;
        }

        Ok(())
    }

    /// Reuse the cached token unless it is within the refresh window.
    async fn current_token<'t>(
        &self,
        message_type: &MessageType,
        queue_name: &QueueName,
        cached: &'t mut Option<QueueToken>,
        summary: &mut ReceiveSummary,
    ) -> Result<&'t QueueToken, GatewayError> {
        let window = self.config.refresh_window;

        let token = match cached.take() {
            Some(token) if !token.needs_refresh(Utc::now(), window) => cached.insert(token),
            _ => {
                let response = self
                    .gateway
                    .query_queue_token(message_type, queue_name)
                    .await?;
                summary.token_refreshes += 1;

                #[cfg(feature = "tracing")]
                debug!(
                    expire_time = %response.message_token.expire_time,
                    "Queue token refreshed"
                );

                cached.insert(response.message_token)
            }
        };

        Ok(token)
    }
}

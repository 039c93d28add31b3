//! Queue transport and report handler traits.

use super::error::QueueError;
use super::message::{QueueMessage, ReceivedReport};
use super::token::QueueToken;
use crate::types::{QueueName, ReceiptHandle};
use std::future::Future;

/// Opens queue sessions from short-lived credentials.
///
/// Implement this over the message queue service of your choice. A new
/// session is opened for every poll, with the token current at that time.
pub trait QueueConnector: Send + Sync {
    type Session: QueueSession;

    /// Open a session authenticated with `token`.
    fn open(
        &self,
        token: &QueueToken,
    ) -> impl Future<Output = Result<Self::Session, QueueError>> + Send;
}

/// Batch operations on an opened queue.
pub trait QueueSession: Send + Sync {
    /// Receive up to `max_messages`, long-polling for `wait_seconds`.
    ///
    /// An empty or missing queue is reported as a 404
    /// [`QueueError::Server`].
    fn batch_receive(
        &self,
        queue: &QueueName,
        max_messages: u32,
        wait_seconds: u32,
    ) -> impl Future<Output = Result<Vec<QueueMessage>, QueueError>> + Send;

    /// Delete processed messages by receipt handle.
    fn batch_delete(
        &self,
        queue: &QueueName,
        receipt_handles: Vec<ReceiptHandle>,
    ) -> impl Future<Output = Result<(), QueueError>> + Send;
}

/// Callback invoked for every verified report.
///
/// Returning `true` marks the message for deletion.
pub trait ReportHandler: Send {
    fn handle(&mut self, report: &ReceivedReport<'_>) -> bool;
}

impl<F> ReportHandler for F
where
    F: FnMut(&ReceivedReport<'_>) -> bool + Send,
{
    fn handle(&mut self, report: &ReceivedReport<'_>) -> bool {
        self(report)
    }
}

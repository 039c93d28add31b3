//! Draining a delivery-report queue with cancellation.
//!
//! `StdinQueue` stands in for a real message queue client: every line typed
//! on stdin becomes one report. An end of input is answered like an empty
//! queue, so the loop stops after three such answers. Ctrl+C cancels.
//!
//! # Running
//!
//! ```bash
//! ALIYUN_ACCESS_KEY_ID=... ALIYUN_ACCESS_KEY_SECRET=... \
//!     cargo run --example delivery_reports -- Alicom-Queue-1234567890-SmsReport
//! ```

use dysms_gateway::queue::{DEFAULT_QUEUE_ENDPOINT, SmsReport};
use dysms_gateway::{
    CancellationToken, DeliveryReportReceiver, GatewayConfig, HttpRpcClient, MessageType,
    QueueConnector, QueueError, QueueMessage, QueueName, QueueSession, QueueToken, ReceiptHandle,
    ReceivedReport, ReceiverConfig, SignError, SigningContext, SmsGatewayClient,
};
use std::collections::BTreeMap;
use std::env;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

fn placeholder_signer(
    _context: &SigningContext<'_>,
    _params: &mut BTreeMap<String, String>,
) -> Result<(), SignError> {
    Ok(())
}

#[derive(Clone, Default)]
struct StdinQueue {
    next_handle: Arc<AtomicU64>,
}

impl QueueConnector for StdinQueue {
    type Session = StdinQueue;

    async fn open(&self, token: &QueueToken) -> Result<Self::Session, QueueError> {
        println!(
            "Opening {DEFAULT_QUEUE_ENDPOINT} as {} (expires {})",
            token.access_key_id, token.expire_time
        );
        Ok(self.clone())
    }
}

impl QueueSession for StdinQueue {
    async fn batch_receive(
        &self,
        _queue: &QueueName,
        _max_messages: u32,
        _wait_seconds: u32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| QueueError::client(e.to_string()))?;
        if read == 0 {
            return Err(QueueError::not_found("MessageNotExist", "Message not exist."));
        }

        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        Ok(vec![QueueMessage::from_body(
            line.trim(),
            format!("rh-{handle}"),
        )])
    }

    async fn batch_delete(
        &self,
        _queue: &QueueName,
        receipt_handles: Vec<ReceiptHandle>,
    ) -> Result<(), QueueError> {
        println!("Deleting {} message(s)", receipt_handles.len());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let queue_name = QueueName::from(
        env::args()
            .nth(1)
            .unwrap_or_else(|| "Alicom-Queue-1234567890-SmsReport".to_string()),
    );

    let config = GatewayConfig::from_env()?;
    let rpc = HttpRpcClient::new(&config, placeholder_signer)?;
    let gateway = SmsGatewayClient::from_config(&config, rpc);

    let cancel_token = CancellationToken::new();
    let trigger = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Cancelling...");
            trigger.cancel();
        }
    });

    // Failures other than "not found" never stop the loop; pause between them
    let config = ReceiverConfig::builder()
        .error_delay(Duration::from_secs(2))
        .build();
    let queue = StdinQueue::default();
    let receiver = DeliveryReportReceiver::new(&gateway, &queue, config);

    println!("Polling {queue_name} (one JSON report per line)...");
    let summary = receiver
        .run_cancellable(
            &MessageType::SmsReport,
            &queue_name,
            |report: &ReceivedReport<'_>| match report.parse::<SmsReport>() {
                Ok(parsed) => {
                    println!(
                        "Report for {}: success={} err={:?}",
                        parsed.phone_number, parsed.success, parsed.err_code
                    );
                    true
                }
                Err(e) => {
                    println!("Unparsable report {}: {e}", report.receipt_handle);
                    false
                }
            },
            cancel_token,
        )
        .await;

    println!("\nSummary: {summary:#?}");
    Ok(())
}

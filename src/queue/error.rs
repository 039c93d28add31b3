//! Queue error types.

use crate::errors::{ClassifiedError, FailureSide};
use thiserror::Error;

/// Errors reported by a [`QueueConnector`](super::QueueConnector) or
/// [`QueueSession`](super::QueueSession).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue could not be reached or its answer could not be read.
    #[error("Queue client error: {message}")]
    Client { message: String },

    /// The queue service rejected the request.
    #[error("Queue server error (HTTP {status}, {code}): {message}")]
    Server {
        status: u16,
        code: String,
        message: String,
    },
}

impl QueueError {
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    pub fn server(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Server answer for a missing or empty queue.
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::server(404, code, message)
    }
}

impl ClassifiedError for QueueError {
    fn side(&self) -> FailureSide {
        match self {
            Self::Client { .. } => FailureSide::Client,
            Self::Server { .. } => FailureSide::Server,
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}

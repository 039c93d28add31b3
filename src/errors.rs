//! Error classification shared by the RPC and queue layers.

/// Which side of the wire a failure originated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSide {
    /// The request never produced a provider answer: building the request,
    /// signing, connecting, timing out, or reading/decoding the body.
    Client,
    /// The provider answered and rejected the request.
    Server,
}

/// Trait for errors that can be classified by origin.
///
/// The delivery-report loop uses this to decide which failures count
/// towards its stop condition:
///
/// 1. **Origin** (`side`): whether the failure happened locally or was
///    reported by the provider.
///
/// 2. **Not found** (`is_not_found`): whether the provider reported the
///    target as missing. For the delivery-report queue this is what an
///    empty or deleted queue looks like.
///
/// # Examples
///
/// ```rust
/// use dysms_gateway::{ClassifiedError, FailureSide};
///
/// enum MyError {
///     Timeout,
///     QueueMissing,
///     Throttled,
/// }
///
/// impl ClassifiedError for MyError {
///     fn side(&self) -> FailureSide {
///         match self {
///             MyError::Timeout => FailureSide::Client,
///             MyError::QueueMissing | MyError::Throttled => FailureSide::Server,
///         }
///     }
///
///     fn is_not_found(&self) -> bool {
///         matches!(self, MyError::QueueMissing)
///     }
/// }
///
/// assert!(MyError::QueueMissing.is_not_found());
/// assert!(MyError::Timeout.is_client_side());
/// ```
pub trait ClassifiedError {
    /// Returns where this failure originated.
    fn side(&self) -> FailureSide;

    /// Returns true if the provider reported the resource as not found.
    ///
    /// Default implementation returns false.
    fn is_not_found(&self) -> bool {
        false
    }

    /// Shorthand for `self.side() == FailureSide::Client`.
    fn is_client_side(&self) -> bool {
        self.side() == FailureSide::Client
    }

    /// Shorthand for `self.side() == FailureSide::Server`.
    fn is_server_side(&self) -> bool {
        self.side() == FailureSide::Server
    }
}

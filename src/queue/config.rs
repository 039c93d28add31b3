//! Delivery-report receiver configuration.

use super::token::DEFAULT_REFRESH_WINDOW;
use crate::gateway::ConfigError;
use std::time::Duration;

/// Largest batch the queue hands out per receive.
pub const MAX_BATCH_SIZE: u32 = 16;

/// Configuration for the delivery-report polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Messages requested per batch receive.
    pub max_messages: u32,
    /// Long-poll duration of a batch receive, in seconds.
    pub wait_seconds: u32,
    /// Not-found failures after which the loop returns.
    pub max_not_found: u32,
    /// Remaining token validity at or below which the token is refreshed.
    pub refresh_window: Duration,
    /// Pause after a failed iteration. Zero means no pause.
    pub error_delay: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfigBuilder::default().build()
    }
}

impl ReceiverConfig {
    /// Create a new builder for ReceiverConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dysms_gateway::queue::ReceiverConfig;
    /// use std::time::Duration;
    ///
    /// let config = ReceiverConfig::builder()
    ///     .max_messages(5)
    ///     .error_delay(Duration::from_millis(500))
    ///     .build();
    ///
    /// assert_eq!(config.max_messages, 5);
    /// assert_eq!(config.max_not_found, 3);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::default()
    }

    pub fn with_max_messages(mut self, max_messages: u32) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_error_delay(mut self, delay: Duration) -> Self {
        self.error_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.max_messages) {
            return Err(ConfigError::Validation(format!(
                "max_messages must be between 1 and {MAX_BATCH_SIZE}"
            )));
        }
        if self.max_not_found == 0 {
            return Err(ConfigError::Validation(
                "max_not_found must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ReceiverConfig.
#[derive(Debug, Clone)]
pub struct ReceiverConfigBuilder {
    max_messages: u32,
    wait_seconds: u32,
    max_not_found: u32,
    refresh_window: Duration,
    error_delay: Duration,
}

impl Default for ReceiverConfigBuilder {
    fn default() -> Self {
        Self {
            max_messages: 10,
            wait_seconds: 5,
            max_not_found: 3,
            refresh_window: DEFAULT_REFRESH_WINDOW,
            error_delay: Duration::ZERO,
        }
    }
}

impl ReceiverConfigBuilder {
    /// Default: 10
    pub fn max_messages(mut self, max_messages: u32) -> Self {
        self.max_messages = max_messages;
        self
    }

    /// Default: 5 seconds
    pub fn wait_seconds(mut self, wait_seconds: u32) -> Self {
        self.wait_seconds = wait_seconds;
        self
    }

    /// Default: 3
    pub fn max_not_found(mut self, max_not_found: u32) -> Self {
        self.max_not_found = max_not_found;
        self
    }

    /// Default: 120 seconds
    pub fn refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window = window;
        self
    }

    /// Default: no pause
    pub fn error_delay(mut self, delay: Duration) -> Self {
        self.error_delay = delay;
        self
    }

    pub fn build(self) -> ReceiverConfig {
        ReceiverConfig {
            max_messages: self.max_messages,
            wait_seconds: self.wait_seconds,
            max_not_found: self.max_not_found,
            refresh_window: self.refresh_window,
            error_delay: self.error_delay,
        }
    }
}

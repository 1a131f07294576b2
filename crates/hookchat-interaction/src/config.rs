//! Webhook transport configuration.

use std::time::Duration;

/// Timeouts for the three kinds of webhook calls.
///
/// Every outbound request is bounded; cancellation is timeout-based only.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Timeout for sending a message (POST).
    pub send_timeout: Duration,
    /// Timeout for the plain connectivity probe (GET).
    pub connect_timeout: Duration,
    /// Timeout for history loads and the probe fallback.
    pub history_timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(5),
            history_timeout: Duration::from_secs(10),
        }
    }
}

impl WebhookConfig {
    /// Overrides the send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Overrides the connectivity probe timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Overrides the history load timeout.
    pub fn with_history_timeout(mut self, timeout: Duration) -> Self {
        self.history_timeout = timeout;
        self
    }
}

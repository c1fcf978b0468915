use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),
    #[error("notification channel unavailable: {0}")]
    ChannelUnavailable(String),
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivery endpoint for alert messages (console log, email, ...).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver `message` verbatim.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` if the message could not be delivered.
    async fn send(&self, message: &str) -> Result<(), NotificationError>;
}

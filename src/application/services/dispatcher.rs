use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::application::settings::LOG_CHANNEL;
use crate::domain::ports::notifier::{NotificationError, NotificationSink};

/// Alias accepted for the log sink.
const LOG_ALIAS: &str = "log";

/// Routes alert messages to a named sink.
///
/// The log sink is always registered and is the fallback for unknown
/// channel names, so a misconfigured channel never drops an alert.
pub struct NotificationDispatcher {
    sinks: HashMap<String, Arc<dyn NotificationSink>>,
    fallback: Arc<dyn NotificationSink>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    /// Build a dispatcher around the log sink, reachable as `console` and `log`.
    #[must_use]
    pub fn new(log_sink: Arc<dyn NotificationSink>, send_timeout: Duration) -> Self {
        let mut sinks: HashMap<String, Arc<dyn NotificationSink>> = HashMap::new();
        sinks.insert(LOG_CHANNEL.to_string(), Arc::clone(&log_sink));
        sinks.insert(LOG_ALIAS.to_string(), Arc::clone(&log_sink));
        Self {
            sinks,
            fallback: log_sink,
            send_timeout,
        }
    }

    /// Register `sink` under `channel` (case-insensitive), replacing any previous one.
    pub fn register(&mut self, channel: &str, sink: Arc<dyn NotificationSink>) {
        self.sinks.insert(normalize(channel), sink);
    }

    /// Sink that `channel` resolves to; the log sink for unknown names.
    #[must_use]
    pub fn resolve(&self, channel: &str) -> Arc<dyn NotificationSink> {
        self.sinks
            .get(&normalize(channel))
            .map_or_else(|| Arc::clone(&self.fallback), Arc::clone)
    }

    /// Registered channel names, sorted.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sinks.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub const fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Deliver `message` through the sink registered as `channel`.
    ///
    /// When a non-log sink fails or times out, the message is also written
    /// to the log sink so it is never lost.
    ///
    /// # Errors
    ///
    /// Returns the `NotificationError` of the selected sink.
    pub async fn dispatch(&self, channel: &str, message: &str) -> Result<(), NotificationError> {
        let key = normalize(channel);
        let (sink, is_fallback) = match self.sinks.get(&key) {
            Some(sink) => (Arc::clone(sink), Arc::ptr_eq(sink, &self.fallback)),
            None => {
                tracing::warn!(
                    "Unknown notification channel '{channel}', using {}",
                    self.fallback.name()
                );
                (Arc::clone(&self.fallback), true)
            }
        };

        let Err(e) = self.send_bounded(sink.as_ref(), message).await else {
            tracing::debug!("Notification delivered via {}", sink.name());
            return Ok(());
        };

        tracing::warn!("Notification via {} failed: {e}", sink.name());
        if !is_fallback {
            if let Err(fallback_err) = self.send_bounded(self.fallback.as_ref(), message).await {
                tracing::error!("Fallback notification failed: {fallback_err}");
            }
        }
        Err(e)
    }

    async fn send_bounded(
        &self,
        sink: &dyn NotificationSink,
        message: &str,
    ) -> Result<(), NotificationError> {
        match tokio::time::timeout(self.send_timeout, sink.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout(self.send_timeout)),
        }
    }
}

fn normalize(channel: &str) -> String {
    channel.trim().to_lowercase()
}

pub mod email;
pub mod log_sink;

use std::sync::Arc;

use crate::application::config::NotificationConfig;
use crate::application::services::dispatcher::NotificationDispatcher;
use crate::application::settings::EMAIL_CHANNEL;

use self::email::EmailSink;
use self::log_sink::LogSink;

/// Dispatcher with the log sink and, when it can be configured, the email sink.
///
/// An unusable email configuration is logged and leaves `email` unregistered,
/// so that channel falls back to the log sink.
#[must_use]
pub fn build_dispatcher(config: &NotificationConfig) -> NotificationDispatcher {
    let mut dispatcher = NotificationDispatcher::new(
        Arc::new(LogSink::default()),
        std::time::Duration::from_secs(config.timeout_secs),
    );

    match EmailSink::new(&config.email, dispatcher.send_timeout()) {
        Ok(sink) => dispatcher.register(EMAIL_CHANNEL, Arc::new(sink)),
        Err(e) if config.channel.trim().eq_ignore_ascii_case(EMAIL_CHANNEL) => {
            tracing::warn!("Email notifications disabled: {e}");
        }
        Err(e) => tracing::debug!("Email sink not registered: {e}"),
    }

    dispatcher
}

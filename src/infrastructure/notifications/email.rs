use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::application::config::EmailConfig;
use crate::domain::ports::notifier::{NotificationError, NotificationSink};

const SUBJECT: &str = "Device Health Alert";

/// Sends alerts as plain-text email over SMTP with STARTTLS.
pub struct EmailSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSink {
    /// Build the SMTP transport. No connection is made until the first send.
    ///
    /// The sender is `from`, or `username` when `from` is unset.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::ChannelUnavailable` when no sender is
    /// configured, an address does not parse, or the relay is invalid.
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self, NotificationError> {
        let sender = config
            .from
            .as_deref()
            .or(config.username.as_deref())
            .ok_or_else(|| {
                NotificationError::ChannelUnavailable(
                    "email sender not configured (set `from` or `username`)".into(),
                )
            })?;
        let from: Mailbox = sender.parse().map_err(|e| {
            NotificationError::ChannelUnavailable(format!("invalid sender '{sender}': {e}"))
        })?;
        let to: Mailbox = config.to.parse().map_err(|e| {
            NotificationError::ChannelUnavailable(format!("invalid recipient '{}': {e}", config.to))
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| {
                NotificationError::ChannelUnavailable(format!(
                    "invalid SMTP relay '{}': {e}",
                    config.smtp_server
                ))
            })?
            .port(config.smtp_port)
            .timeout(Some(timeout));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
        })
    }

    fn build_message(&self, body: &str) -> Result<Message, NotificationError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotificationError::SendFailed(format!("cannot build email: {e}")))
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        let email = self.build_message(message)?;
        self.mailer
            .send(email)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP error: {e}")))?;
        tracing::info!("Alert email sent to {}", self.to);
        Ok(())
    }
}

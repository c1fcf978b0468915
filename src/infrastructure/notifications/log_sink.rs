use std::borrow::Cow;

use async_trait::async_trait;
use colored::Colorize;

use crate::domain::ports::notifier::{NotificationError, NotificationSink};

const SEPARATOR_WIDTH: usize = 60;

/// Writes alerts to the log and, optionally, to the terminal. Never fails.
pub struct LogSink {
    echo: bool,
}

impl LogSink {
    /// `echo` also prints each alert as a coloured block on stdout.
    #[must_use]
    pub const fn new(echo: bool) -> Self {
        Self { echo }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        let message = sanitize(message);
        for line in message.lines() {
            tracing::warn!("ALERT: {line}");
        }

        if self.echo {
            let separator = "\u{2500}".repeat(SEPARATOR_WIDTH);
            println!("\n{}", separator.dimmed());
            println!("{}", " \u{26a0} Device Health Alert ".on_red().white().bold());
            for line in message.lines() {
                println!("  {}", line.red());
            }
            println!("{}\n", separator.dimmed());
        }
        Ok(())
    }
}

/// Strip ANSI escape sequences and C0/C1 control characters from a string,
/// preserving only printable content, newlines, and tabs.
fn sanitize(s: &str) -> Cow<'_, str> {
    if s.bytes()
        .any(|b| matches!(b, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F))
    {
        Cow::Owned(
            s.chars()
                .filter(|&c| !matches!(c as u32, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F))
                .collect(),
        )
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize("High CPU\x1b[31m Usage"), "High CPU[31m Usage");
        assert_eq!(sanitize("line1\nline2\tend"), "line1\nline2\tend");
    }

    #[test]
    fn sanitize_borrows_clean_input() {
        assert!(matches!(sanitize("clean"), Cow::Borrowed(_)));
    }

    #[tokio::test]
    async fn send_never_fails() {
        colored::control::set_override(false);
        let sink = LogSink::default();
        assert!(sink
            .send("High CPU Usage: 95%\nHigh CPU Temperature: 85°C")
            .await
            .is_ok());
        assert!(LogSink::new(false).send("").await.is_ok());
    }

    #[test]
    fn name_is_console() {
        assert_eq!(LogSink::default().name(), "console");
    }
}

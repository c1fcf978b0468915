#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use devhealth::application::config::{EmailConfig, NotificationConfig};
use devhealth::application::services::dispatcher::NotificationDispatcher;
use devhealth::domain::ports::notifier::{NotificationError, NotificationSink};
use devhealth::infrastructure::notifications::build_dispatcher;

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

struct MemorySink {
    name: &'static str,
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            messages: Mutex::new(vec![]),
        })
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        self.messages.lock().expect("lock").push(message.to_string());
        Ok(())
    }
}

struct RejectingSink;

#[async_trait]
impl NotificationSink for RejectingSink {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, _message: &str) -> Result<(), NotificationError> {
        Err(NotificationError::SendFailed("gateway returned 503".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_channel_falls_back_to_log_sink() {
    let log = MemorySink::new("console");
    let dispatcher = NotificationDispatcher::new(log.clone(), Duration::from_secs(1));

    dispatcher
        .dispatch("pager", "High Disk Usage: 97%")
        .await
        .expect("fallback delivery");
    assert_eq!(log.messages(), vec!["High Disk Usage: 97%"]);
}

#[tokio::test]
async fn failed_sink_still_leaves_a_log_record() {
    let log = MemorySink::new("console");
    let mut dispatcher = NotificationDispatcher::new(log.clone(), Duration::from_secs(1));
    dispatcher.register("SMS", Arc::new(RejectingSink));

    let result = dispatcher.dispatch(" sms ", "High Memory Usage: 93%").await;
    assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    assert_eq!(log.messages(), vec!["High Memory Usage: 93%"]);
}

#[tokio::test]
async fn registered_channel_bypasses_log_sink() {
    let log = MemorySink::new("console");
    let team = MemorySink::new("team");
    let mut dispatcher = NotificationDispatcher::new(log.clone(), Duration::from_secs(1));
    dispatcher.register("team", team.clone());

    dispatcher
        .dispatch("team", "High CPU Usage: 91%")
        .await
        .expect("delivered");
    assert_eq!(team.messages(), vec!["High CPU Usage: 91%"]);
    assert!(log.messages().is_empty());
}

#[test]
fn email_without_credentials_resolves_to_log_sink() {
    let config = NotificationConfig {
        channel: "email".into(),
        email: EmailConfig {
            username: None,
            from: None,
            ..EmailConfig::default()
        },
        ..NotificationConfig::default()
    };
    let dispatcher = build_dispatcher(&config);
    assert_eq!(dispatcher.resolve("email").name(), "console");
    assert_eq!(dispatcher.send_timeout(), Duration::from_secs(15));
}

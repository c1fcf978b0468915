#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use devhealth::application::services::agent::{MonitorAgent, StartOutcome};
use devhealth::application::services::dispatcher::NotificationDispatcher;
use devhealth::application::settings::AgentSettings;
use devhealth::domain::entities::sample::{
    CpuReading, NetworkStatus, Sample, TEMPERATURE_UNAVAILABLE,
};
use devhealth::domain::entities::verdict::HealthStatus;
use devhealth::domain::ports::metrics::{MetricsProvider, SamplingError};
use devhealth::domain::ports::notifier::{NotificationError, NotificationSink};
use devhealth::domain::ports::repository::{
    RecordId, SampleRepository, StorageError, StoredSample,
};
use devhealth::domain::value_objects::agent_phase::AgentPhase;
use devhealth::domain::value_objects::metric::Metric;
use devhealth::infrastructure::notifications::log_sink::LogSink;
use devhealth::infrastructure::persistence::in_memory_store::InMemoryRepository;
use devhealth::infrastructure::persistence::retry::RetryPolicy;
use devhealth::infrastructure::persistence::sqlite_store::SqliteRepository;

// ---------------------------------------------------------------------------
// ScriptedProvider
// ---------------------------------------------------------------------------

struct ScriptedProvider {
    cpu: f64,
    temperature: Option<f64>,
    network_up: bool,
    panic_first_call: bool,
    cpu_delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    const fn healthy() -> Self {
        Self {
            cpu: 12.0,
            temperature: Some(45.0),
            network_up: true,
            panic_first_call: false,
            cpu_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsProvider for ScriptedProvider {
    async fn sample_cpu(&self) -> Result<CpuReading, SamplingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            !(self.panic_first_call && call == 0),
            "sensor driver crashed"
        );
        if !self.cpu_delay.is_zero() {
            tokio::time::sleep(self.cpu_delay).await;
        }
        Ok(CpuReading {
            usage_percent: self.cpu,
            temperature_celsius: self.temperature,
        })
    }

    async fn sample_memory(&self) -> Result<f64, SamplingError> {
        Ok(35.0)
    }

    async fn sample_disk(&self) -> Result<f64, SamplingError> {
        Ok(60.0)
    }

    async fn sample_network(&self) -> Result<NetworkStatus, SamplingError> {
        if self.network_up {
            Ok(NetworkStatus::Measured {
                download_mbps: 90.0,
                upload_mbps: 20.0,
                ping_ms: 15.0,
            })
        } else {
            Err(SamplingError::unavailable(
                Metric::Network,
                "speed test server unreachable",
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        self.messages.lock().expect("lock").push(message.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared event log
// ---------------------------------------------------------------------------

type Events = Arc<Mutex<Vec<&'static str>>>;

struct EventRepository {
    inner: InMemoryRepository,
    events: Events,
    fail: bool,
}

impl SampleRepository for EventRepository {
    fn store(&self, sample: &Sample) -> Result<RecordId, StorageError> {
        self.events.lock().expect("lock").push("store");
        if self.fail {
            return Err(StorageError::WriteFailed("disk full".into()));
        }
        self.inner.store(sample)
    }

    fn latest_for_device(&self, device_id: Uuid) -> Result<Option<StoredSample>, StorageError> {
        self.inner.latest_for_device(device_id)
    }

    fn recent_for_device(
        &self,
        device_id: Uuid,
        limit: usize,
    ) -> Result<Vec<StoredSample>, StorageError> {
        self.inner.recent_for_device(device_id, limit)
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredSample>, StorageError> {
        self.inner.recent(limit)
    }
}

struct EventSink {
    events: Events,
}

#[async_trait]
impl NotificationSink for EventSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, _message: &str) -> Result<(), NotificationError> {
        self.events.lock().expect("lock").push("send");
        Ok(())
    }
}

fn event_agent(events: &Events, fail_store: bool) -> MonitorAgent {
    let mut dispatcher =
        NotificationDispatcher::new(Arc::new(LogSink::new(false)), Duration::from_secs(5));
    dispatcher.register(
        "recording",
        Arc::new(EventSink {
            events: events.clone(),
        }),
    );
    MonitorAgent::new(
        settings(300),
        Arc::new(ScriptedProvider {
            cpu: 99.0,
            ..ScriptedProvider::healthy()
        }),
        Arc::new(EventRepository {
            inner: InMemoryRepository::new(),
            events: events.clone(),
            fail: fail_store,
        }),
        dispatcher,
    )
}

fn settings(interval_secs: u64) -> AgentSettings {
    AgentSettings {
        sampling_interval: Duration::from_secs(interval_secs),
        error_cooldown: Duration::from_secs(interval_secs * 6),
        network_probe: true,
        notification_channel: "recording".into(),
        ..AgentSettings::default()
    }
}

fn dispatcher(sink: Arc<RecordingSink>) -> NotificationDispatcher {
    let mut dispatcher =
        NotificationDispatcher::new(Arc::new(LogSink::new(false)), Duration::from_secs(5));
    dispatcher.register("recording", sink);
    dispatcher
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn second_start_does_not_spawn_another_loop() {
    let provider = Arc::new(ScriptedProvider::healthy());
    let repository = Arc::new(InMemoryRepository::new());
    let agent = MonitorAgent::new(
        settings(10),
        provider.clone(),
        repository.clone(),
        dispatcher(Arc::new(RecordingSink::default())),
    );

    assert_eq!(agent.start(), Ok(StartOutcome::Started));
    assert_eq!(
        agent.start(),
        Ok(StartOutcome::AlreadyActive(AgentPhase::Running))
    );

    // ticks at t=0, 10, 20, 30 from a single loop
    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(provider.calls(), 4);
    assert_eq!(repository.len().expect("len"), 4);

    agent.stop().await;
    assert_eq!(agent.phase(), AgentPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_interrupts_the_interval_sleep() {
    let provider = Arc::new(ScriptedProvider::healthy());
    let agent = MonitorAgent::new(
        settings(300),
        provider.clone(),
        Arc::new(InMemoryRepository::new()),
        dispatcher(Arc::new(RecordingSink::default())),
    );

    agent.start().expect("start");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(provider.calls(), 1);

    let before = tokio::time::Instant::now();
    agent.stop().await;
    assert!(before.elapsed() < Duration::from_secs(1));
    assert_eq!(agent.phase(), AgentPhase::Idle);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn network_failure_still_stores_a_complete_sample() {
    let provider = Arc::new(ScriptedProvider {
        network_up: false,
        ..ScriptedProvider::healthy()
    });
    let repository = Arc::new(InMemoryRepository::new());
    let agent = MonitorAgent::new(
        settings(300),
        provider,
        repository.clone(),
        dispatcher(Arc::new(RecordingSink::default())),
    );

    let report = agent.run_once().await;
    assert_eq!(report.sampling_errors, 1);
    assert_eq!(report.sample.network_status, NetworkStatus::Unavailable);
    assert!((report.sample.cpu_usage - 12.0).abs() < f64::EPSILON);

    let stored = repository.all().expect("all");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sample, report.sample);
}

#[tokio::test]
async fn missing_sensor_records_temperature_sentinel() {
    let provider = Arc::new(ScriptedProvider {
        temperature: None,
        ..ScriptedProvider::healthy()
    });
    let agent = MonitorAgent::new(
        settings(300),
        provider,
        Arc::new(InMemoryRepository::new()),
        dispatcher(Arc::new(RecordingSink::default())),
    );

    let report = agent.run_once().await;
    assert!((report.sample.temperature - TEMPERATURE_UNAVAILABLE).abs() < f64::EPSILON);
    assert_eq!(report.sampling_errors, 0);
    assert_eq!(report.verdict.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn timestamps_never_go_backwards() {
    let repository = Arc::new(InMemoryRepository::new());
    let agent = MonitorAgent::new(
        settings(300),
        Arc::new(ScriptedProvider::healthy()),
        repository.clone(),
        dispatcher(Arc::new(RecordingSink::default())),
    );

    for _ in 0..5 {
        agent.run_once().await;
    }

    let stored = repository.all().expect("all");
    assert_eq!(stored.len(), 5);
    assert!(stored
        .windows(2)
        .all(|pair| pair[0].sample.timestamp <= pair[1].sample.timestamp));
    assert_eq!(agent.last_tick(), Some(stored[4].sample.timestamp));
}

#[tokio::test]
async fn critical_sample_is_persisted_and_alerted_once() {
    let sink = Arc::new(RecordingSink::default());
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("health.db");
    let repository = Arc::new(
        SqliteRepository::open(path.to_str().expect("utf8 path"), RetryPolicy::default())
            .expect("open"),
    );
    let agent = MonitorAgent::new(
        settings(300),
        Arc::new(ScriptedProvider {
            cpu: 97.5,
            temperature: Some(88.0),
            ..ScriptedProvider::healthy()
        }),
        repository.clone(),
        dispatcher(sink.clone()),
    );

    let report = agent.run_once().await;
    assert!(report.notified);
    assert!(report.record_id.is_some());

    let messages = sink.messages.lock().expect("lock").clone();
    assert_eq!(
        messages,
        vec!["High CPU Usage: 97.5%\nHigh CPU Temperature: 88°C".to_string()]
    );

    let latest = repository
        .latest_for_device(agent.device_id())
        .expect("read")
        .expect("stored");
    assert_eq!(Some(latest.id), report.record_id);
    assert_eq!(latest.sample, report.sample);
}

#[tokio::test(start_paused = true)]
async fn panicking_provider_backs_off_then_recovers() {
    let provider = Arc::new(ScriptedProvider {
        panic_first_call: true,
        ..ScriptedProvider::healthy()
    });
    let repository = Arc::new(InMemoryRepository::new());
    let agent = MonitorAgent::new(
        settings(10),
        provider.clone(),
        repository.clone(),
        dispatcher(Arc::new(RecordingSink::default())),
    );

    agent.start().expect("start");

    // cooldown is 60s, so nothing new before then
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(provider.calls(), 1);
    assert!(repository.is_empty().expect("is_empty"));
    assert!(agent.health_snapshot().is_none());

    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(repository.len().expect("len"), 1);
    let snapshot = agent.health_snapshot().expect("snapshot after recovery");
    assert_eq!(snapshot.verdict.status, HealthStatus::Healthy);

    agent.stop().await;
    assert_eq!(agent.phase(), AgentPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_waits_for_the_tick_in_flight() {
    let provider = Arc::new(ScriptedProvider {
        cpu_delay: Duration::from_secs(5),
        ..ScriptedProvider::healthy()
    });
    let repository = Arc::new(InMemoryRepository::new());
    let agent = MonitorAgent::new(
        settings(300),
        provider.clone(),
        repository.clone(),
        dispatcher(Arc::new(RecordingSink::default())),
    );

    agent.start().expect("start");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(provider.calls(), 1);
    assert!(repository.is_empty().expect("is_empty"));

    let before = tokio::time::Instant::now();
    agent.stop().await;
    assert!(before.elapsed() >= Duration::from_secs(4));
    assert_eq!(agent.phase(), AgentPhase::Idle);

    let stored = repository.all().expect("all");
    assert_eq!(stored.len(), 1);
    assert!((stored[0].sample.cpu_usage - 12.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn alert_is_sent_only_after_the_sample_is_stored() {
    let events: Events = Arc::default();
    let report = event_agent(&events, false).run_once().await;

    assert!(report.record_id.is_some());
    assert!(report.notified);
    assert_eq!(*events.lock().expect("lock"), vec!["store", "send"]);
}

#[tokio::test]
async fn failed_store_still_precedes_the_alert() {
    let events: Events = Arc::default();
    let report = event_agent(&events, true).run_once().await;

    assert!(report.record_id.is_none());
    assert!(report.notified);
    assert_eq!(*events.lock().expect("lock"), vec!["store", "send"]);
}

#[tokio::test]
async fn single_precision_reading_alerts_with_one_decimal() {
    let sink = Arc::new(RecordingSink::default());
    let agent = MonitorAgent::new(
        settings(300),
        Arc::new(ScriptedProvider {
            cpu: f64::from(90.1_f32),
            ..ScriptedProvider::healthy()
        }),
        Arc::new(InMemoryRepository::new()),
        dispatcher(sink.clone()),
    );

    let report = agent.run_once().await;
    assert_eq!(report.verdict.violations, vec!["High CPU Usage: 90.1%"]);
    assert_eq!(
        *sink.messages.lock().expect("lock"),
        vec!["High CPU Usage: 90.1%".to_string()]
    );
}

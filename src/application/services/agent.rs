use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::dispatcher::NotificationDispatcher;
use super::sampler::collect_sample;
use super::state::AgentState;
use crate::application::settings::AgentSettings;
use crate::domain::entities::sample::Sample;
use crate::domain::entities::verdict::Verdict;
use crate::domain::evaluator::ThresholdEvaluator;
use crate::domain::ports::metrics::MetricsProvider;
use crate::domain::ports::repository::{RecordId, SampleRepository, StorageError};
use crate::domain::value_objects::agent_phase::AgentPhase;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("the monitoring agent must be started from within a Tokio runtime")]
    NoRuntime,
}

/// What `start()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A loop is already active (or still shutting down); nothing was spawned.
    AlreadyActive(AgentPhase),
}

/// Latest sample seen by the agent and its verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSnapshot {
    pub sample: Sample,
    pub verdict: Verdict,
    /// `None` when persisting the sample failed
    pub record_id: Option<RecordId>,
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub sample: Sample,
    pub record_id: Option<RecordId>,
    pub verdict: Verdict,
    pub sampling_errors: usize,
    pub notified: bool,
}

struct Worker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

struct AgentInner {
    settings: AgentSettings,
    provider: Arc<dyn MetricsProvider>,
    repository: Arc<dyn SampleRepository>,
    dispatcher: NotificationDispatcher,
    state: AgentState,
    snapshot: RwLock<Option<HealthSnapshot>>,
}

/// Periodically samples the device: collect → persist → evaluate → notify → sleep.
///
/// At most one sampling loop runs per agent. Lifecycle:
/// `Idle → Running → Stopping → Idle`.
pub struct MonitorAgent {
    inner: Arc<AgentInner>,
    worker: Mutex<Option<Worker>>,
}

impl MonitorAgent {
    /// Create an idle agent with a freshly generated device identifier.
    #[must_use]
    pub fn new(
        settings: AgentSettings,
        provider: Arc<dyn MetricsProvider>,
        repository: Arc<dyn SampleRepository>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            inner: Arc::new(AgentInner {
                settings,
                provider,
                repository,
                dispatcher,
                state: AgentState::new(Uuid::new_v4()),
                snapshot: RwLock::new(None),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Launch the background sampling loop.
    ///
    /// Idempotent: while a loop is running or stopping, returns
    /// [`StartOutcome::AlreadyActive`] without spawning another.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::NoRuntime` when called outside a Tokio runtime.
    pub fn start(&self) -> Result<StartOutcome, AgentError> {
        let runtime = Handle::try_current().map_err(|_| AgentError::NoRuntime)?;
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        if let Err(phase) = self
            .inner
            .state
            .transition(AgentPhase::Idle, AgentPhase::Running)
        {
            tracing::debug!("Start ignored, agent is {phase}");
            return Ok(StartOutcome::AlreadyActive(phase));
        }

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_loop(Arc::clone(&self.inner), cancel.clone()));
        *worker = Some(Worker { handle, cancel });

        tracing::info!(
            "Monitoring started (device {}, every {}s)",
            self.inner.state.device_id(),
            self.inner.settings.sampling_interval.as_secs()
        );
        Ok(StartOutcome::Started)
    }

    /// Signal the loop to stop and wait for the in-flight tick to finish.
    ///
    /// Returns once the agent is `Idle`. A no-op when no loop is active.
    pub async fn stop(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return;
        };

        // Fails only if the loop already left `Running` on its own.
        let _ = self
            .inner
            .state
            .transition(AgentPhase::Running, AgentPhase::Stopping);
        worker.cancel.cancel();

        if let Err(e) = worker.handle.await {
            tracing::error!("Sampling loop ended abnormally: {e}");
        }
        let _ = self
            .inner
            .state
            .transition(AgentPhase::Stopping, AgentPhase::Idle);
        tracing::info!("Monitoring stopped");
    }

    /// Run a single tick immediately, outside the loop.
    pub async fn run_once(&self) -> TickReport {
        self.inner.tick(&CancellationToken::new()).await
    }

    #[must_use]
    pub fn phase(&self) -> AgentPhase {
        self.inner.state.phase()
    }

    #[must_use]
    pub fn device_id(&self) -> Uuid {
        self.inner.state.device_id()
    }

    /// Timestamp of the most recent sample.
    #[must_use]
    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.inner.state.last_tick()
    }

    #[must_use]
    pub fn settings(&self) -> &AgentSettings {
        &self.inner.settings
    }

    /// Latest sample and verdict, without waiting for the next tick.
    #[must_use]
    pub fn health_snapshot(&self) -> Option<HealthSnapshot> {
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for MonitorAgent {
    fn drop(&mut self) {
        let worker = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(worker) = worker.as_ref() {
            worker.cancel.cancel();
        }
    }
}

async fn run_loop(inner: Arc<AgentInner>, cancel: CancellationToken) {
    loop {
        let tick = tokio::spawn({
            let inner = Arc::clone(&inner);
            let cancel = cancel.clone();
            async move { inner.tick(&cancel).await }
        });

        let pause = match tick.await {
            Ok(report) => {
                tracing::debug!(
                    "Tick done: {} ({} sampling error(s))",
                    report.verdict.status,
                    report.sampling_errors
                );
                inner.settings.sampling_interval
            }
            Err(e) => {
                let cooldown = inner.settings.error_cooldown;
                tracing::error!("Tick failed: {e}; retrying in {}s", cooldown.as_secs());
                cooldown
            }
        };

        if cancel.is_cancelled() || !interruptible_sleep(&cancel, pause).await {
            break;
        }
    }

    let _ = inner
        .state
        .transition(AgentPhase::Stopping, AgentPhase::Idle);
}

/// Sleep for `pause`; `false` if cancelled first.
async fn interruptible_sleep(cancel: &CancellationToken, pause: Duration) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(pause) => true,
    }
}

impl AgentInner {
    async fn tick(&self, cancel: &CancellationToken) -> TickReport {
        let outcome = collect_sample(
            &self.provider,
            self.state.device_id(),
            &self.settings,
            cancel,
        )
        .await;
        let mut sample = outcome.sample;
        sample.timestamp = self.state.advance_clock(sample.timestamp);

        let record_id = match self.persist(&sample).await {
            Ok(id) => {
                tracing::debug!("Stored sample {id}");
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Failed to store sample: {e}");
                None
            }
        };

        let verdict = ThresholdEvaluator::evaluate(&sample, &self.settings.thresholds);
        self.publish(HealthSnapshot {
            sample: sample.clone(),
            verdict: verdict.clone(),
            record_id,
        });

        let mut notified = false;
        if let Some(payload) = verdict.notification_payload() {
            tracing::warn!("{} threshold violation(s) detected", verdict.violations.len());
            match self
                .dispatcher
                .dispatch(&self.settings.notification_channel, &payload)
                .await
            {
                Ok(()) => notified = true,
                Err(e) => tracing::warn!("Alert notification failed: {e}"),
            }
        } else {
            tracing::debug!("System OK, no threshold violations");
        }

        TickReport {
            sample,
            record_id,
            verdict,
            sampling_errors: outcome.errors.len(),
            notified,
        }
    }

    async fn persist(&self, sample: &Sample) -> Result<RecordId, StorageError> {
        let repository = Arc::clone(&self.repository);
        let owned = sample.clone();
        let write = tokio::task::spawn_blocking(move || repository.store(&owned));

        match tokio::time::timeout(self.settings.timeouts.storage, write).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(StorageError::WriteFailed(join_error.to_string())),
            Err(_) => Err(StorageError::Timeout),
        }
    }

    fn publish(&self, snapshot: HealthSnapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }
}

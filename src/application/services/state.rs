use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::agent_phase::AgentPhase;

/// Per-agent runtime state. The phase is shared between the caller and the
/// sampling worker; the clock is only advanced by the worker.
#[derive(Debug)]
pub struct AgentState {
    phase: AtomicU8,
    device_id: Uuid,
    last_tick: Mutex<Option<DateTime<Utc>>>,
}

impl AgentState {
    #[must_use]
    pub fn new(device_id: Uuid) -> Self {
        Self {
            phase: AtomicU8::new(AgentPhase::Idle.as_u8()),
            device_id,
            last_tick: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn phase(&self) -> AgentPhase {
        AgentPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Atomically move from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns the phase actually observed when it was not `from`.
    pub fn transition(&self, from: AgentPhase, to: AgentPhase) -> Result<(), AgentPhase> {
        self.phase
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(AgentPhase::from_u8)
    }

    #[must_use]
    pub const fn device_id(&self) -> Uuid {
        self.device_id
    }

    #[must_use]
    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        match self.last_tick.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Record a tick and return its timestamp, never earlier than the previous one.
    pub fn advance_clock(&self, candidate: DateTime<Utc>) -> DateTime<Utc> {
        let mut guard = match self.last_tick.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let timestamp = guard.map_or(candidate, |last| last.max(candidate));
        *guard = Some(timestamp);
        timestamp
    }
}

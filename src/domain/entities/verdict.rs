use serde::{Deserialize, Serialize};

/// Health classification of a sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HealthStatus {
    Healthy,
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Outcome of evaluating a sample against the thresholds. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: HealthStatus,
    /// One message per breached threshold: CPU, temperature, memory, disk.
    pub violations: Vec<String>,
}

impl Verdict {
    /// Build a verdict from its violations; `Critical` iff the list is non-empty.
    #[must_use]
    pub fn from_violations(violations: Vec<String>) -> Self {
        let status = if violations.is_empty() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Critical
        };
        Self { status, violations }
    }

    #[must_use]
    pub fn healthy() -> Self {
        Self::from_violations(Vec::new())
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.status == HealthStatus::Critical
    }

    /// Newline-joined violations, `None` when healthy.
    #[must_use]
    pub fn notification_payload(&self) -> Option<String> {
        self.is_critical().then(|| self.violations.join("\n"))
    }
}

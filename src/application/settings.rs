use std::time::Duration;

use crate::domain::value_objects::thresholds::ThresholdSet;

/// Channel name of the console/log sink, always registered.
pub const LOG_CHANNEL: &str = "console";

/// Channel name of the SMTP sink.
pub const EMAIL_CHANNEL: &str = "email";

/// Resolved, validated agent settings. Immutable for the agent's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub sampling_interval: Duration,
    /// Pause after a tick fails unexpectedly; longer than `sampling_interval`
    pub error_cooldown: Duration,
    pub thresholds: ThresholdSet,
    pub notification_channel: String,
    pub network_probe: bool,
    pub timeouts: CallTimeouts,
}

/// Upper bound for each call the agent makes to an external dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimeouts {
    /// CPU, memory and disk readings
    pub sample: Duration,
    pub network: Duration,
    pub storage: Duration,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            sample: Duration::from_secs(10),
            network: Duration::from_secs(60),
            storage: Duration::from_secs(10),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            sampling_interval: Duration::from_secs(300),
            error_cooldown: Duration::from_secs(600),
            thresholds: ThresholdSet::default(),
            notification_channel: LOG_CHANNEL.to_string(),
            network_probe: false,
            timeouts: CallTimeouts::default(),
        }
    }
}

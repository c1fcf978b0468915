use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Temperature recorded when no sensor reading is available.
///
/// A genuine 0 °C reading is indistinguishable from this sentinel.
pub const TEMPERATURE_UNAVAILABLE: f64 = 0.0;

/// Percentage recorded when a CPU, memory or disk reading failed.
pub const PERCENT_UNAVAILABLE: f64 = 0.0;

/// One point-in-time set of readings for a device.
///
/// A sample is only built once every sub-reading has resolved, either to a
/// value or to its documented "unavailable" form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub device_id: Uuid,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    /// Degrees Celsius, [`TEMPERATURE_UNAVAILABLE`] when unknown
    pub temperature: f64,
    pub network_status: NetworkStatus,
}

/// Result of the network probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NetworkStatus {
    Measured {
        download_mbps: f64,
        upload_mbps: f64,
        ping_ms: f64,
    },
    /// The probe ran and failed or timed out.
    #[default]
    Unavailable,
    /// Probing is disabled by configuration.
    Skipped,
}

impl NetworkStatus {
    #[must_use]
    pub const fn is_measured(&self) -> bool {
        matches!(self, Self::Measured { .. })
    }
}

impl std::fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measured {
                download_mbps,
                upload_mbps,
                ping_ms,
            } => write!(
                f,
                "down {download_mbps:.1} Mbps / up {upload_mbps:.1} Mbps / ping {ping_ms:.0} ms"
            ),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Raw CPU reading returned by a metrics provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuReading {
    pub usage_percent: f64,
    /// `None` when no temperature sensor could be read
    pub temperature_celsius: Option<f64>,
}

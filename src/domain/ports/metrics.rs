use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::sample::{CpuReading, NetworkStatus};
use crate::domain::value_objects::metric::Metric;

/// A single metric could not be read. Never fatal: the agent substitutes
/// the metric's "unavailable" value and keeps sampling the others.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("{metric} unavailable: {reason}")]
    Unavailable { metric: Metric, reason: String },
    #[error("{metric} reading out of range: {value}")]
    InvalidReading { metric: Metric, value: f64 },
    #[error("timeout while sampling {0}")]
    Timeout(Metric),
    #[error("sampling of {0} interrupted by shutdown")]
    Interrupted(Metric),
}

impl SamplingError {
    #[must_use]
    pub fn unavailable(metric: Metric, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            metric,
            reason: reason.into(),
        }
    }

    /// Metric the error refers to.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        match self {
            Self::Unavailable { metric, .. } | Self::InvalidReading { metric, .. } => *metric,
            Self::Timeout(metric) | Self::Interrupted(metric) => *metric,
        }
    }
}

/// Source of raw metric readings. Each call may fail independently.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Current CPU usage percentage and, when a sensor exists, temperature.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError` if CPU usage cannot be read.
    async fn sample_cpu(&self) -> Result<CpuReading, SamplingError>;

    /// Current memory usage percentage.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError` if memory statistics cannot be read.
    async fn sample_memory(&self) -> Result<f64, SamplingError>;

    /// Current disk usage percentage.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError` if no disk usage can be determined.
    async fn sample_disk(&self) -> Result<f64, SamplingError>;

    /// Network throughput and latency. Slow: may take several seconds.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError` if the probe fails or is not configured.
    async fn sample_network(&self) -> Result<NetworkStatus, SamplingError>;
}

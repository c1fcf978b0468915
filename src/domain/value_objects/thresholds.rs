use serde::{Deserialize, Serialize};

use super::metric::Metric;

/// Critical limits, one per thresholded metric.
///
/// A reading breaches its limit only when it is strictly greater than it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// CPU usage percentage
    pub cpu_usage: f64,
    /// Memory usage percentage
    pub memory_usage: f64,
    /// Disk usage percentage
    pub disk_usage: f64,
    /// CPU temperature in degrees Celsius
    pub temperature: f64,
}

impl ThresholdSet {
    /// Limit configured for `metric`, `None` for metrics without a threshold.
    #[must_use]
    pub const fn limit(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::CpuUsage => Some(self.cpu_usage),
            Metric::Temperature => Some(self.temperature),
            Metric::MemoryUsage => Some(self.memory_usage),
            Metric::DiskUsage => Some(self.disk_usage),
            Metric::Network => None,
        }
    }

    /// First limit that is negative or not finite, in reporting order.
    #[must_use]
    pub fn first_invalid(&self) -> Option<(Metric, f64)> {
        Metric::THRESHOLDED.into_iter().find_map(|metric| {
            let value = self.limit(metric)?;
            (!value.is_finite() || value < 0.0).then_some((metric, value))
        })
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            cpu_usage: 90.0,
            memory_usage: 90.0,
            disk_usage: 90.0,
            temperature: 80.0,
        }
    }
}

use serde::{Deserialize, Serialize};

/// A metric sampled on every tick.
///
/// The declaration order is the order in which threshold violations are
/// reported: CPU, temperature, memory, disk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CpuUsage,
    Temperature,
    MemoryUsage,
    DiskUsage,
    Network,
}

impl Metric {
    /// Metrics that carry a critical threshold, in reporting order.
    pub const THRESHOLDED: [Self; 4] = [
        Self::CpuUsage,
        Self::Temperature,
        Self::MemoryUsage,
        Self::DiskUsage,
    ];

    /// Configuration key of the metric (`cpu_usage`, `temperature`, ...).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CpuUsage => "cpu_usage",
            Self::Temperature => "temperature",
            Self::MemoryUsage => "memory_usage",
            Self::DiskUsage => "disk_usage",
            Self::Network => "network",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

use crate::domain::entities::sample::Sample;
use crate::domain::entities::verdict::Verdict;
use crate::domain::value_objects::metric::Metric;
use crate::domain::value_objects::thresholds::ThresholdSet;

/// Compares samples against critical thresholds.
///
/// Pure and deterministic: no I/O, no clock. A reading equal to its
/// threshold is healthy; only a strictly greater reading is a violation.
pub struct ThresholdEvaluator;

impl ThresholdEvaluator {
    /// Evaluate `sample`, reporting violations in the order CPU,
    /// temperature, memory, disk.
    #[must_use]
    pub fn evaluate(sample: &Sample, thresholds: &ThresholdSet) -> Verdict {
        let violations = Metric::THRESHOLDED
            .into_iter()
            .filter_map(|metric| {
                let limit = thresholds.limit(metric)?;
                let value = reading(sample, metric);
                (value > limit).then(|| violation_message(metric, value))
            })
            .collect();
        Verdict::from_violations(violations)
    }
}

fn reading(sample: &Sample, metric: Metric) -> f64 {
    match metric {
        Metric::CpuUsage => sample.cpu_usage,
        Metric::Temperature => sample.temperature,
        Metric::MemoryUsage => sample.memory_usage,
        Metric::DiskUsage => sample.disk_usage,
        Metric::Network => f64::NAN,
    }
}

fn violation_message(metric: Metric, value: f64) -> String {
    match metric {
        Metric::CpuUsage => format!("High CPU Usage: {value}%"),
        Metric::Temperature => format!("High CPU Temperature: {value}°C"),
        Metric::MemoryUsage => format!("High Memory Usage: {value}%"),
        Metric::DiskUsage => format!("High Disk Usage: {value}%"),
        Metric::Network => format!("Network anomaly: {value}"),
    }
}

use colored::Colorize;

use super::status_fmt::{colorize_percent, colorize_temperature, progress_bar};
use crate::domain::entities::sample::{NetworkStatus, Sample, TEMPERATURE_UNAVAILABLE};
use crate::domain::value_objects::thresholds::ThresholdSet;

const BAR_WIDTH: usize = 30;

/// Multi-line rendering of a sample, one metric per line.
#[must_use]
pub fn format_sample(sample: &Sample, thresholds: &ThresholdSet) -> String {
    let mut out = String::new();
    for (label, value, limit) in [
        ("CPU    ", sample.cpu_usage, thresholds.cpu_usage),
        ("Memory ", sample.memory_usage, thresholds.memory_usage),
        ("Disk   ", sample.disk_usage, thresholds.disk_usage),
    ] {
        out.push_str(&format!(
            "  {label} {} {}\n",
            progress_bar(value, limit, BAR_WIDTH),
            colorize_percent(value, limit)
        ));
    }
    out.push_str(&format!(
        "  Temp     {}\n",
        colorize_temperature(sample.temperature, thresholds.temperature)
    ));
    out.push_str(&format!("  Network  {}\n", format_network(&sample.network_status)));
    out
}

#[must_use]
pub fn format_network(status: &NetworkStatus) -> String {
    match status {
        NetworkStatus::Measured { .. } => status.to_string(),
        NetworkStatus::Unavailable => status.to_string().yellow().to_string(),
        NetworkStatus::Skipped => status.to_string().dimmed().to_string(),
    }
}

/// Single-line rendering used by the history listing.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn format_sample_row(sample: &Sample) -> String {
    let temperature = if sample.temperature == TEMPERATURE_UNAVAILABLE {
        format!("{:>7}", "n/a")
    } else {
        format!("{:>5.1}°C", sample.temperature)
    };
    format!(
        "{}  cpu {:>5.1}%  mem {:>5.1}%  disk {:>5.1}%  temp {temperature}  net {}",
        sample.timestamp.format("%Y-%m-%d %H:%M:%S"),
        sample.cpu_usage,
        sample.memory_usage,
        sample.disk_usage,
        sample.network_status
    )
}

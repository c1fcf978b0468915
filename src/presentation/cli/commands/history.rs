use anyhow::Context;
use colored::Colorize;
use uuid::Uuid;

use crate::domain::ports::repository::{SampleRepository, StoredSample};
use crate::presentation::cli::formatters::sample_fmt::format_sample_row;

/// Most recent samples, newest first, optionally for a single device.
///
/// # Errors
///
/// Returns an error if `limit` is zero or the repository read fails.
pub fn load_history(
    repository: &dyn SampleRepository,
    device: Option<Uuid>,
    limit: usize,
) -> anyhow::Result<Vec<StoredSample>> {
    if limit == 0 {
        anyhow::bail!("--limit must be greater than 0");
    }
    match device {
        Some(id) => repository.recent_for_device(id, limit),
        None => repository.recent(limit),
    }
    .context("Failed to read stored samples")
}

/// Print recently stored samples.
///
/// # Errors
///
/// Returns an error if the read or JSON serialization fails.
pub fn run_history(
    repository: &dyn SampleRepository,
    device: Option<Uuid>,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let samples = load_history(repository, device, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&samples)?);
        return Ok(());
    }

    if samples.is_empty() {
        println!("{}", "No samples recorded yet.".dimmed());
        return Ok(());
    }

    let mut current_device = None;
    for stored in &samples {
        if current_device != Some(stored.sample.device_id) {
            current_device = Some(stored.sample.device_id);
            println!("{}", format!("device {}", stored.sample.device_id).bold().cyan());
        }
        println!(
            "  {:>6}  {}",
            stored.id.to_string().dimmed(),
            format_sample_row(&stored.sample)
        );
    }
    Ok(())
}

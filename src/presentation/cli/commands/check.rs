use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::agent::{MonitorAgent, TickReport};
use crate::domain::entities::sample::Sample;
use crate::domain::entities::verdict::Verdict;
use crate::domain::ports::repository::RecordId;
use crate::presentation::cli::formatters::sample_fmt::format_sample;
use crate::presentation::cli::formatters::status_fmt::{print_section_header, status_badge};

#[derive(Serialize)]
struct CheckOutput<'a> {
    device_id: Uuid,
    record_id: Option<RecordId>,
    sample: &'a Sample,
    verdict: &'a Verdict,
    sampling_errors: usize,
    notified: bool,
}

impl<'a> From<&'a TickReport> for CheckOutput<'a> {
    fn from(report: &'a TickReport) -> Self {
        Self {
            device_id: report.sample.device_id,
            record_id: report.record_id,
            sample: &report.sample,
            verdict: &report.verdict,
            sampling_errors: report.sampling_errors,
            notified: report.notified,
        }
    }
}

/// Run one tick (sample, store, evaluate, notify) and print the verdict.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub async fn run_check(agent: &MonitorAgent, json: bool) -> anyhow::Result<()> {
    let report = agent.run_once().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&CheckOutput::from(&report))?);
        return Ok(());
    }

    println!("{}", "devhealth — Health Check".bold().cyan());
    println!("{}", "━".repeat(50));
    println!(
        "  {}  {}",
        status_badge(report.verdict.status),
        report.sample.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    print_section_header("\nReadings");
    print!("{}", format_sample(&report.sample, &agent.settings().thresholds));

    if report.verdict.is_critical() {
        print_section_header("\nViolations");
        for violation in &report.verdict.violations {
            println!("  {} {}", "✗".red().bold(), violation);
        }
    }

    println!();
    match report.record_id {
        Some(id) => println!("  Stored as {id} (device {})", report.sample.device_id),
        None => println!("  {}", "Sample was not stored, see log".yellow()),
    }
    if report.sampling_errors > 0 {
        println!(
            "  {}",
            format!("{} metric(s) could not be read", report.sampling_errors).yellow()
        );
    }
    Ok(())
}

use colored::Colorize;

use crate::domain::entities::system_info::SystemInfo;

/// Print the host description.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run_info(info: &SystemInfo, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(info)?);
        return Ok(());
    }

    println!("{}", "devhealth — System Information".bold().cyan());
    println!("{}", "━".repeat(50));
    for (label, value) in [
        ("Hostname", &info.hostname),
        ("OS", &info.os),
        ("OS version", &info.os_version),
        ("Processor", &info.processor),
        ("Machine", &info.machine),
    ] {
        println!("  {:<12}{}", format!("{label}:").bold(), value);
    }
    Ok(())
}

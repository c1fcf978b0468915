use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use crate::application::config::AppConfig;
use crate::application::services::dispatcher::NotificationDispatcher;

const REDACTED: &str = "********";

/// Copy of `config` safe to print: the SMTP password is masked.
#[must_use]
pub fn redacted(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    if shown.notifications.email.password.is_some() {
        shown.notifications.email.password = Some(REDACTED.to_string());
    }
    shown
}

/// Registered channels and the sink the configured channel resolves to.
#[must_use]
pub fn channel_summary(config: &AppConfig, dispatcher: &NotificationDispatcher) -> String {
    let channel = config.notifications.channel.trim().to_lowercase();
    format!(
        "# channels: {} (alerts for '{channel}' go to {})",
        dispatcher.channels().join(", "),
        dispatcher.resolve(&channel).name()
    )
}

/// Print the effective configuration; with `write`, create the config file
/// at `path` when it does not exist yet.
///
/// # Errors
///
/// Returns an error if serialization or writing the file fails.
pub fn run_config(
    config: &AppConfig,
    dispatcher: &NotificationDispatcher,
    path: &Path,
    write: bool,
) -> anyhow::Result<()> {
    if write {
        if path.exists() {
            println!(
                "{}",
                format!("Config already exists at {}, left untouched", path.display()).yellow()
            );
        } else {
            AppConfig::default()
                .save_to(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "Wrote default config to".green(), path.display());
        }
    }

    println!("{} {}", "# config file:".dimmed(), path.display());
    println!("{}", channel_summary(config, dispatcher).dimmed());
    let text = toml::to_string_pretty(&redacted(config)).context("Failed to serialize config")?;
    print!("{text}");
    Ok(())
}

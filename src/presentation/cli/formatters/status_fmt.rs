use colored::{ColoredString, Colorize};

use crate::domain::entities::sample::TEMPERATURE_UNAVAILABLE;
use crate::domain::entities::verdict::HealthStatus;

/// Share of the limit above which a reading is shown as a warning.
const WARNING_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Ok,
    Warning,
    Critical,
}

fn level(value: f64, limit: f64) -> Level {
    if value > limit {
        Level::Critical
    } else if value > limit * WARNING_RATIO {
        Level::Warning
    } else {
        Level::Ok
    }
}

fn paint(text: String, level: Level) -> ColoredString {
    match level {
        Level::Critical => text.red().bold(),
        Level::Warning => text.yellow(),
        Level::Ok => text.green(),
    }
}

/// Usage bar for a percentage, coloured against its critical `limit`.
#[must_use]
pub fn progress_bar(value: f64, limit: f64, width: usize) -> String {
    let ratio = (value / 100.0).clamp(0.0, 1.0);
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar = paint("█".repeat(filled), level(value, limit));
    format!("{bar}{}", "░".repeat(empty))
}

#[must_use]
pub fn colorize_percent(value: f64, limit: f64) -> ColoredString {
    paint(format!("{value:.1}%"), level(value, limit))
}

/// Temperature in °C, or a dimmed "n/a" for the unavailable sentinel.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn colorize_temperature(value: f64, limit: f64) -> ColoredString {
    if value == TEMPERATURE_UNAVAILABLE {
        return "n/a".dimmed();
    }
    paint(format!("{value:.1}°C"), level(value, limit))
}

#[must_use]
pub fn status_badge(status: HealthStatus) -> ColoredString {
    match status {
        HealthStatus::Healthy => " HEALTHY ".on_green().black().bold(),
        HealthStatus::Critical => " CRITICAL ".on_red().white().bold(),
    }
}

pub fn print_section_header(title: &str) {
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count()).cyan());
}

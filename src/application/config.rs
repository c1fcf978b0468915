use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::settings::{AgentSettings, CallTimeouts, LOG_CHANNEL};
use crate::domain::value_objects::metric::Metric;
use crate::domain::value_objects::thresholds::ThresholdSet;

/// Invalid configuration. Fatal: the agent refuses to start.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("sampling interval must be greater than zero")]
    InvalidInterval,
    #[error("threshold {metric} must be a finite non-negative number, got {value}")]
    InvalidThreshold { metric: Metric, value: f64 },
    #[error("error cooldown ({cooldown_secs}s) must be longer than the sampling interval ({interval_secs}s)")]
    InvalidCooldown { cooldown_secs: u64, interval_secs: u64 },
    #[error("timeout {0} must be greater than zero")]
    InvalidTimeout(&'static str),
    #[error("storage.max_attempts must be at least 1")]
    InvalidRetryPolicy,
}

/// Top-level configuration document loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sampling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Defaults to twice the interval when absent.
    #[serde(default)]
    pub error_cooldown_secs: Option<u64>,
}

/// Critical thresholds, keyed by metric name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_percent_threshold")]
    pub cpu_usage: f64,
    #[serde(default = "default_percent_threshold")]
    pub memory_usage: f64,
    #[serde(default = "default_percent_threshold")]
    pub disk_usage: f64,
    #[serde(default = "default_temperature_threshold")]
    pub temperature: f64,
}

/// Active channel and sink-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub email: EmailConfig,
}

/// SMTP credentials for the email sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Sender address; falls back to `username`.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default = "default_recipient")]
    pub to: String,
}

/// Network throughput probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_download_url")]
    pub download_url: String,
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    #[serde(default = "default_upload_bytes")]
    pub upload_bytes: usize,
    #[serde(default = "default_network_timeout")]
    pub timeout_secs: u64,
}

/// Per-call timeouts for metric sampling and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_sample_timeout")]
    pub sample_secs: u64,
    #[serde(default = "default_storage_timeout")]
    pub storage_secs: u64,
}

/// Sample database location and write retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Append logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<String>,
}

// --- Defaults ---

const fn default_interval() -> u64 {
    300
}

const fn default_percent_threshold() -> f64 {
    90.0
}

const fn default_temperature_threshold() -> f64 {
    80.0
}

fn default_channel() -> String {
    LOG_CHANNEL.into()
}

const fn default_notification_timeout() -> u64 {
    15
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".into()
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_recipient() -> String {
    "admin@example.com".into()
}

fn default_download_url() -> String {
    "https://speed.cloudflare.com/__down?bytes=10000000".into()
}

fn default_upload_url() -> String {
    "https://speed.cloudflare.com/__up".into()
}

const fn default_upload_bytes() -> usize {
    2_000_000
}

const fn default_network_timeout() -> u64 {
    60
}

const fn default_sample_timeout() -> u64 {
    10
}

const fn default_storage_timeout() -> u64 {
    10
}

// NOTE: stored raw with the tilde; expanded with shellexpand where it is opened.
fn default_database_path() -> String {
    "~/.local/share/devhealth/device_health.db".into()
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff() -> u64 {
    100
}

const fn default_max_backoff() -> u64 {
    2_000
}

// --- Default impls ---

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            error_cooldown_secs: None,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cpu_usage: default_percent_threshold(),
            memory_usage: default_percent_threshold(),
            disk_usage: default_percent_threshold(),
            temperature: default_temperature_threshold(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            timeout_secs: default_notification_timeout(),
            email: EmailConfig::default(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
            to: default_recipient(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            download_url: default_download_url(),
            upload_url: default_upload_url(),
            upload_bytes: default_upload_bytes(),
            timeout_secs: default_network_timeout(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            sample_secs: default_sample_timeout(),
            storage_secs: default_storage_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load from a specific path, or use defaults if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::info!(
                "No config file at {}, using defaults",
                path.to_string_lossy()
            );
            Ok(Self::default())
        }
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML content is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Default config file location (`<config dir>/devhealth/config.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("devhealth").join("config.toml"))
    }

    /// Check every value and resolve the settings the agent runs with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for a zero interval, a negative or
    /// non-finite threshold, a cooldown not longer than the interval,
    /// a zero timeout, or a retry policy without attempts.
    pub fn validate(&self) -> Result<AgentSettings, ConfigurationError> {
        let interval_secs = self.general.interval_secs;
        if interval_secs == 0 {
            return Err(ConfigurationError::InvalidInterval);
        }

        let thresholds = ThresholdSet::from(&self.thresholds);
        if let Some((metric, value)) = thresholds.first_invalid() {
            return Err(ConfigurationError::InvalidThreshold { metric, value });
        }

        let sampling_interval = Duration::from_secs(interval_secs);
        let error_cooldown = match self.general.error_cooldown_secs {
            Some(cooldown_secs) if cooldown_secs <= interval_secs => {
                return Err(ConfigurationError::InvalidCooldown {
                    cooldown_secs,
                    interval_secs,
                });
            }
            Some(cooldown_secs) => Duration::from_secs(cooldown_secs),
            None => sampling_interval.saturating_mul(2),
        };

        let timeouts = CallTimeouts {
            sample: positive_secs(self.timeouts.sample_secs, "timeouts.sample_secs")?,
            network: positive_secs(self.network.timeout_secs, "network.timeout_secs")?,
            storage: positive_secs(self.timeouts.storage_secs, "timeouts.storage_secs")?,
        };
        positive_secs(self.notifications.timeout_secs, "notifications.timeout_secs")?;

        if self.storage.max_attempts == 0 {
            return Err(ConfigurationError::InvalidRetryPolicy);
        }

        Ok(AgentSettings {
            sampling_interval,
            error_cooldown,
            thresholds,
            notification_channel: self.notifications.channel.trim().to_lowercase(),
            network_probe: self.network.enabled,
            timeouts,
        })
    }
}

fn positive_secs(secs: u64, name: &'static str) -> Result<Duration, ConfigurationError> {
    if secs == 0 {
        Err(ConfigurationError::InvalidTimeout(name))
    } else {
        Ok(Duration::from_secs(secs))
    }
}

impl From<&ThresholdConfig> for ThresholdSet {
    fn from(config: &ThresholdConfig) -> Self {
        Self {
            cpu_usage: config.cpu_usage,
            memory_usage: config.memory_usage,
            disk_usage: config.disk_usage,
            temperature: config.temperature,
        }
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use sysinfo::{Components, CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

use super::disk_usage::{list_disks, primary_disk, DiskSpace};
use super::network_probe::HttpNetworkProbe;
use crate::domain::entities::sample::{CpuReading, NetworkStatus};
use crate::domain::entities::system_info::SystemInfo;
use crate::domain::ports::metrics::{MetricsProvider, SamplingError};
use crate::domain::value_objects::metric::Metric;

/// Sensor labels that identify a CPU temperature.
const CPU_SENSOR_HINTS: &[&str] = &["cpu", "package", "core", "tctl", "k10temp"];

/// Returns `(numerator / denominator) * 100.0`, or `0.0` when `denominator` is zero.
#[allow(clippy::cast_precision_loss)]
fn safe_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        (numerator as f64 / denominator as f64) * 100.0
    } else {
        0.0
    }
}

/// Reads host metrics through the `sysinfo` crate.
///
/// `sysinfo` types need `&mut self` to refresh, so each one sits behind a
/// `Mutex`. Refreshes are blocking syscalls and run on the blocking pool;
/// guards are never held across an `.await`.
pub struct SysinfoProvider {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    components: Arc<Mutex<Components>>,
    network: Option<HttpNetworkProbe>,
}

impl SysinfoProvider {
    /// Creates a provider. Without a probe, network sampling reports unavailable.
    #[must_use]
    pub fn new(network: Option<HttpNetworkProbe>) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            components: Arc::new(Mutex::new(Components::new_with_refreshed_list())),
            network,
        }
    }

    /// Static description of the host.
    #[must_use]
    pub fn system_info(&self) -> SystemInfo {
        let processor = self
            .sys
            .lock()
            .ok()
            .and_then(|sys| sys.cpus().first().map(|cpu| cpu.brand().trim().to_string()))
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        SystemInfo {
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_version: System::os_version()
                .or_else(System::kernel_version)
                .unwrap_or_else(|| "unknown".to_string()),
            processor,
            machine: std::env::consts::ARCH.to_string(),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    metric: Metric,
    what: &str,
) -> Result<MutexGuard<'a, T>, SamplingError> {
    mutex
        .lock()
        .map_err(|e| SamplingError::unavailable(metric, format!("{what} lock poisoned: {e}")))
}

/// Run a blocking `sysinfo` read on the blocking pool.
async fn off_runtime<T, F>(metric: Metric, read: F) -> Result<T, SamplingError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SamplingError> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|e| SamplingError::unavailable(metric, format!("sysinfo task failed: {e}")))?
}

fn cpu_temperature(components: &Mutex<Components>) -> Option<f64> {
    let mut components = components.lock().ok()?;
    components.refresh();
    pick_cpu_temperature(
        components
            .iter()
            .map(|component| (component.label(), component.temperature())),
    )
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl MetricsProvider for SysinfoProvider {
    async fn sample_cpu(&self) -> Result<CpuReading, SamplingError> {
        // Usage is a delta between two refreshes.
        let sys = Arc::clone(&self.sys);
        off_runtime(Metric::CpuUsage, move || {
            lock(&sys, Metric::CpuUsage, "system")?.refresh_cpu_usage();
            Ok(())
        })
        .await?;
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;

        let sys = Arc::clone(&self.sys);
        let components = Arc::clone(&self.components);
        off_runtime(Metric::CpuUsage, move || {
            let usage_percent = {
                let mut sys = lock(&sys, Metric::CpuUsage, "system")?;
                sys.refresh_cpu_usage();
                if sys.cpus().is_empty() {
                    return Err(SamplingError::unavailable(
                        Metric::CpuUsage,
                        "no CPU reported",
                    ));
                }
                f64::from(sys.global_cpu_usage())
            };
            Ok(CpuReading {
                usage_percent,
                temperature_celsius: cpu_temperature(&components),
            })
        })
        .await
    }

    async fn sample_memory(&self) -> Result<f64, SamplingError> {
        let sys = Arc::clone(&self.sys);
        off_runtime(Metric::MemoryUsage, move || {
            let mut sys = lock(&sys, Metric::MemoryUsage, "system")?;
            sys.refresh_memory();
            let total = sys.total_memory();
            if total == 0 {
                return Err(SamplingError::unavailable(
                    Metric::MemoryUsage,
                    "total memory reported as zero",
                ));
            }
            Ok(safe_percent(sys.used_memory(), total))
        })
        .await
    }

    async fn sample_disk(&self) -> Result<f64, SamplingError> {
        let disks = Arc::clone(&self.disks);
        off_runtime(Metric::DiskUsage, move || {
            let mut disks = lock(&disks, Metric::DiskUsage, "disk")?;
            disks.refresh_list();

            let real = list_disks(&disks);
            primary_disk(&real)
                .map(DiskSpace::usage_percent)
                .ok_or_else(|| SamplingError::unavailable(Metric::DiskUsage, "no mounted disk"))
        })
        .await
    }

    async fn sample_network(&self) -> Result<NetworkStatus, SamplingError> {
        match &self.network {
            Some(probe) => probe.measure().await,
            None => Err(SamplingError::unavailable(
                Metric::Network,
                "network probe not configured",
            )),
        }
    }
}

/// First finite reading from a CPU-like sensor, else the hottest finite one.
fn pick_cpu_temperature<'a>(readings: impl IntoIterator<Item = (&'a str, f32)>) -> Option<f64> {
    let valid: Vec<(String, f64)> = readings
        .into_iter()
        .map(|(label, celsius)| (label.to_lowercase(), f64::from(celsius)))
        .filter(|(_, celsius)| celsius.is_finite() && *celsius > 0.0)
        .collect();

    valid
        .iter()
        .find(|(label, _)| CPU_SENSOR_HINTS.iter().any(|hint| label.contains(hint)))
        .or_else(|| valid.iter().max_by(|a, b| a.1.total_cmp(&b.1)))
        .map(|(_, celsius)| *celsius)
}

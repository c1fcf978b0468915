use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::settings::AgentSettings;
use crate::domain::entities::sample::{
    NetworkStatus, Sample, PERCENT_UNAVAILABLE, TEMPERATURE_UNAVAILABLE,
};
use crate::domain::ports::metrics::{MetricsProvider, SamplingError};
use crate::domain::value_objects::metric::Metric;

/// A fully resolved sample and the per-metric failures met while building it.
#[derive(Debug, Clone)]
pub struct SamplingOutcome {
    pub sample: Sample,
    pub errors: Vec<SamplingError>,
}

/// Read every metric concurrently and assemble one atomic [`Sample`].
///
/// Each provider call runs as its own task under its own timeout, so a
/// call that blocks its thread still times out. A failed reading is
/// replaced by its "unavailable" value and reported in
/// [`SamplingOutcome::errors`]; it never aborts the other readings. Only
/// the network measurement observes `cancel`, since it is the one slow call.
///
/// Readings are rounded to one decimal place.
pub async fn collect_sample(
    provider: &Arc<dyn MetricsProvider>,
    device_id: Uuid,
    settings: &AgentSettings,
    cancel: &CancellationToken,
) -> SamplingOutcome {
    let limit = settings.timeouts.sample;

    let cpu = {
        let provider = Arc::clone(provider);
        bounded(Metric::CpuUsage, limit, None, async move {
            provider.sample_cpu().await
        })
    };
    let memory = {
        let provider = Arc::clone(provider);
        bounded(Metric::MemoryUsage, limit, None, async move {
            provider.sample_memory().await
        })
    };
    let disk = {
        let provider = Arc::clone(provider);
        bounded(Metric::DiskUsage, limit, None, async move {
            provider.sample_disk().await
        })
    };
    let network = measure_network(provider, settings, cancel);

    let (cpu, memory, disk, network) = tokio::join!(cpu, memory, disk, network);

    let mut errors = Vec::new();

    let (cpu_result, temperature) = match cpu {
        Ok(reading) => (Ok(reading.usage_percent), reading.temperature_celsius),
        Err(e) => (Err(e), None),
    };
    let cpu_usage = resolve_percent(Metric::CpuUsage, cpu_result, &mut errors);
    let temperature = resolve_temperature(temperature, &mut errors);
    let memory_usage = resolve_percent(Metric::MemoryUsage, memory, &mut errors);
    let disk_usage = resolve_percent(Metric::DiskUsage, disk, &mut errors);

    let network_status = match network {
        Ok(status) => status,
        Err(e) => {
            errors.push(e);
            NetworkStatus::Unavailable
        }
    };

    for error in &errors {
        tracing::warn!("Sampling: {error}");
    }

    SamplingOutcome {
        sample: Sample {
            timestamp: Utc::now(),
            device_id,
            cpu_usage,
            memory_usage,
            disk_usage,
            temperature,
            network_status,
        },
        errors,
    }
}

/// Spawn `call` and wait for it at most `limit`, or until `cancel` fires.
///
/// A panic inside the call is resumed on the caller so the tick fails the
/// same way it would have without the extra task.
async fn bounded<T, F>(
    metric: Metric,
    limit: Duration,
    cancel: Option<&CancellationToken>,
    call: F,
) -> Result<T, SamplingError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, SamplingError>> + Send + 'static,
{
    let mut task = tokio::spawn(call);
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };

    let joined = tokio::select! {
        joined = tokio::time::timeout(limit, &mut task) => Some(joined),
        () = cancelled => None,
    };
    let Some(joined) = joined else {
        task.abort();
        return Err(SamplingError::Interrupted(metric));
    };

    match joined {
        Ok(Ok(result)) => result,
        Ok(Err(e)) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Ok(Err(e)) => Err(SamplingError::unavailable(
            metric,
            format!("sampling task failed: {e}"),
        )),
        Err(_) => {
            task.abort();
            Err(SamplingError::Timeout(metric))
        }
    }
}

async fn measure_network(
    provider: &Arc<dyn MetricsProvider>,
    settings: &AgentSettings,
    cancel: &CancellationToken,
) -> Result<NetworkStatus, SamplingError> {
    if !settings.network_probe {
        return Ok(NetworkStatus::Skipped);
    }
    let provider = Arc::clone(provider);
    bounded(
        Metric::Network,
        settings.timeouts.network,
        Some(cancel),
        async move { provider.sample_network().await },
    )
    .await
}

/// One decimal place, matching how readings are reported.
fn round_reading(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn resolve_percent(
    metric: Metric,
    result: Result<f64, SamplingError>,
    errors: &mut Vec<SamplingError>,
) -> f64 {
    match result {
        Ok(value) if !value.is_finite() => {
            errors.push(SamplingError::InvalidReading { metric, value });
            PERCENT_UNAVAILABLE
        }
        Ok(value) if !(0.0..=100.0).contains(&value) => {
            tracing::warn!("{metric} reading {value} outside 0-100, clamping");
            value.clamp(0.0, 100.0)
        }
        Ok(value) => round_reading(value),
        Err(e) => {
            errors.push(e);
            PERCENT_UNAVAILABLE
        }
    }
}

fn resolve_temperature(reading: Option<f64>, errors: &mut Vec<SamplingError>) -> f64 {
    match reading {
        Some(value) if value.is_finite() => round_reading(value),
        Some(value) => {
            errors.push(SamplingError::InvalidReading {
                metric: Metric::Temperature,
                value,
            });
            TEMPERATURE_UNAVAILABLE
        }
        None => {
            tracing::debug!("No temperature sensor reading");
            TEMPERATURE_UNAVAILABLE
        }
    }
}

use std::time::{Duration, Instant};

use crate::application::config::NetworkConfig;
use crate::domain::entities::sample::NetworkStatus;
use crate::domain::ports::metrics::SamplingError;
use crate::domain::value_objects::metric::Metric;

const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// Measures latency and throughput against HTTP endpoints.
///
/// Ping is the round trip of a `HEAD` request, download is a timed `GET`
/// of a fixed-size payload, upload a timed `POST` of `upload_bytes` zero bytes.
pub struct HttpNetworkProbe {
    client: reqwest::Client,
    download_url: String,
    upload_url: String,
    upload_bytes: usize,
}

impl HttpNetworkProbe {
    /// Creates a probe whose every request is bounded by `config.timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError::Unavailable` if the HTTP client cannot be
    /// initialized (e.g. TLS backend failure).
    pub fn new(config: &NetworkConfig) -> Result<Self, SamplingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .build()
            .map_err(|e| {
                SamplingError::unavailable(
                    Metric::Network,
                    format!("cannot create HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            client,
            download_url: config.download_url.clone(),
            upload_url: config.upload_url.clone(),
            upload_bytes: config.upload_bytes,
        })
    }

    /// Run ping, download and upload in sequence.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError::Unavailable` on the first failed request.
    pub async fn measure(&self) -> Result<NetworkStatus, SamplingError> {
        let ping_ms = self.ping().await?;
        let download_mbps = self.download().await?;
        let upload_mbps = self.upload().await?;

        tracing::debug!(
            "Network: down {download_mbps:.1} Mbps, up {upload_mbps:.1} Mbps, ping {ping_ms:.0} ms"
        );
        Ok(NetworkStatus::Measured {
            download_mbps,
            upload_mbps,
            ping_ms,
        })
    }

    async fn ping(&self) -> Result<f64, SamplingError> {
        let started = Instant::now();
        self.client
            .head(&self.download_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| network_error("ping", &e))?;
        Ok(started.elapsed().as_secs_f64() * 1000.0)
    }

    async fn download(&self) -> Result<f64, SamplingError> {
        let started = Instant::now();
        let mut response = self
            .client
            .get(&self.download_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| network_error("download", &e))?;

        let mut received: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| network_error("download", &e))?
        {
            received += chunk.len() as u64;
        }
        Ok(throughput_mbps(received, started.elapsed()))
    }

    async fn upload(&self) -> Result<f64, SamplingError> {
        let payload = vec![0u8; self.upload_bytes];
        let started = Instant::now();
        self.client
            .post(&self.upload_url)
            .body(payload)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| network_error("upload", &e))?;
        Ok(throughput_mbps(self.upload_bytes as u64, started.elapsed()))
    }
}

fn network_error(stage: &str, error: &reqwest::Error) -> SamplingError {
    let reason = if error.is_timeout() {
        format!("{stage} timed out")
    } else {
        format!("{stage} failed: {error}")
    };
    SamplingError::unavailable(Metric::Network, reason)
}

/// Megabits per second for `bytes` transferred in `elapsed`; 0 for an instant transfer.
#[allow(clippy::cast_precision_loss)]
fn throughput_mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        (bytes as f64 * 8.0) / BITS_PER_MEGABIT / secs
    } else {
        0.0
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::sample::Sample;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
    #[error("storage write failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
    #[error("storage call timed out")]
    Timeout,
}

/// Identifier assigned to a persisted sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A sample read back from the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSample {
    pub id: RecordId,
    pub sample: Sample,
}

/// Append-only, durable store of samples.
pub trait SampleRepository: Send + Sync {
    /// Persist a sample. The sample is durable once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` once the write fails for good, after a
    /// bounded number of retries for transient failures.
    fn store(&self, sample: &Sample) -> Result<RecordId, StorageError>;

    /// Most recently stored sample for a device.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read operation fails.
    fn latest_for_device(&self, device_id: Uuid) -> Result<Option<StoredSample>, StorageError>;

    /// Up to `limit` samples for a device, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read operation fails.
    fn recent_for_device(
        &self,
        device_id: Uuid,
        limit: usize,
    ) -> Result<Vec<StoredSample>, StorageError>;

    /// Up to `limit` samples across all devices, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read operation fails.
    fn recent(&self, limit: usize) -> Result<Vec<StoredSample>, StorageError>;
}

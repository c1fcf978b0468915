use std::sync::Mutex;

use uuid::Uuid;

use crate::domain::entities::sample::Sample;
use crate::domain::ports::repository::{RecordId, SampleRepository, StorageError, StoredSample};

/// In-memory sample log for testing purposes.
pub struct InMemoryRepository {
    samples: Mutex<Vec<StoredSample>>,
}

impl InMemoryRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Mutex::new(Vec::new()),
        }
    }

    /// Number of stored samples.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ReadFailed` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self
            .samples
            .lock()
            .map_err(|_| StorageError::ReadFailed("lock poisoned".into()))?
            .len())
    }

    /// # Errors
    ///
    /// Returns `StorageError::ReadFailed` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        self.len().map(|n| n == 0)
    }

    /// All samples in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ReadFailed` if the lock is poisoned.
    pub fn all(&self) -> Result<Vec<StoredSample>, StorageError> {
        Ok(self
            .samples
            .lock()
            .map_err(|_| StorageError::ReadFailed("lock poisoned".into()))?
            .clone())
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleRepository for InMemoryRepository {
    fn store(&self, sample: &Sample) -> Result<RecordId, StorageError> {
        let mut samples = self
            .samples
            .lock()
            .map_err(|_| StorageError::WriteFailed("lock poisoned".into()))?;
        let next = i64::try_from(samples.len() + 1)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        let id = RecordId(next);
        samples.push(StoredSample {
            id,
            sample: sample.clone(),
        });
        drop(samples);
        Ok(id)
    }

    fn latest_for_device(&self, device_id: Uuid) -> Result<Option<StoredSample>, StorageError> {
        Ok(self.recent_for_device(device_id, 1)?.into_iter().next())
    }

    fn recent_for_device(
        &self,
        device_id: Uuid,
        limit: usize,
    ) -> Result<Vec<StoredSample>, StorageError> {
        let samples = self
            .samples
            .lock()
            .map_err(|_| StorageError::ReadFailed("lock poisoned".into()))?;
        Ok(samples
            .iter()
            .rev()
            .filter(|s| s.sample.device_id == device_id)
            .take(limit)
            .cloned()
            .collect())
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredSample>, StorageError> {
        let samples = self
            .samples
            .lock()
            .map_err(|_| StorageError::ReadFailed("lock poisoned".into()))?;
        Ok(samples.iter().rev().take(limit).cloned().collect())
    }
}

pub mod metrics;
pub mod notifier;
pub mod repository;

pub use metrics::{MetricsProvider, SamplingError};
pub use notifier::{NotificationError, NotificationSink};
pub use repository::{RecordId, SampleRepository, StorageError, StoredSample};

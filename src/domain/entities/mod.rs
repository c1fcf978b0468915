pub mod sample;
pub mod system_info;
pub mod verdict;

pub use sample::{CpuReading, NetworkStatus, Sample, PERCENT_UNAVAILABLE, TEMPERATURE_UNAVAILABLE};
pub use system_info::SystemInfo;
pub use verdict::{HealthStatus, Verdict};

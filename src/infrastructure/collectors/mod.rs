pub mod disk_usage;
pub mod network_probe;
pub mod sysinfo_provider;

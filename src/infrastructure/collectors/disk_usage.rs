use std::path::{Path, PathBuf};

use sysinfo::Disks;

/// Filesystem types excluded from disk usage.
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "tmpfs",
    "devtmpfs",
    "sysfs",
    "proc",
    "cgroup2",
    "overlay",
    "squashfs",
    "efivarfs",
    "bpf",
    "hugetlbfs",
    "mqueue",
    "pstore",
    "securityfs",
    "debugfs",
    "tracefs",
    "fusectl",
    "rpc_pipefs",
];

/// Capacity of one mounted filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSpace {
    pub mount_point: PathBuf,
    pub filesystem: String,
    pub total: u64,
    pub available: u64,
}

impl DiskSpace {
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn usage_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let used = self.total.saturating_sub(self.available);
        ((used as f64 / self.total as f64) * 100.0).clamp(0.0, 100.0)
    }

    fn is_real(&self) -> bool {
        self.total > 0
            && !PSEUDO_FILESYSTEMS
                .iter()
                .any(|&pseudo| self.filesystem == pseudo)
    }
}

/// Snapshot of the real (non-pseudo, non-empty) filesystems in `disks`.
pub fn list_disks(disks: &Disks) -> Vec<DiskSpace> {
    disks
        .iter()
        .map(|disk| DiskSpace {
            mount_point: disk.mount_point().to_path_buf(),
            filesystem: disk.file_system().to_string_lossy().to_string(),
            total: disk.total_space(),
            available: disk.available_space(),
        })
        .filter(DiskSpace::is_real)
        .collect()
}

/// The system disk: the `/` mount, or the largest filesystem when there is none.
#[must_use]
pub fn primary_disk(disks: &[DiskSpace]) -> Option<&DiskSpace> {
    disks
        .iter()
        .find(|d| d.mount_point == Path::new("/"))
        .or_else(|| disks.iter().max_by_key(|d| d.total))
}

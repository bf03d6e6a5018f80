//! Disk usage for a single mount point.

use crate::format::percent_of;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sysinfo::Disks;
use tracing::debug;

/// Default mount point reported.
pub const DEFAULT_MOUNT_POINT: &str = "/";

/// Disk information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInfo {
    /// Device name
    pub device: String,
    /// Mount point
    pub mount_point: String,
    /// Filesystem type
    pub filesystem: String,
    /// Total space in bytes
    pub total_bytes: u64,
    /// Available space in bytes
    pub available_bytes: u64,
    /// Used space in bytes
    pub used_bytes: u64,
    /// Usage percentage, one decimal
    pub usage_percent: f64,
}

impl DiskInfo {
    /// Build from raw space figures.
    pub fn from_space(
        device: impl Into<String>,
        mount_point: impl Into<String>,
        filesystem: impl Into<String>,
        total_bytes: u64,
        available_bytes: u64,
    ) -> Self {
        let used_bytes = total_bytes.saturating_sub(available_bytes);
        Self {
            device: device.into(),
            mount_point: mount_point.into(),
            filesystem: filesystem.into(),
            total_bytes,
            available_bytes,
            used_bytes,
            usage_percent: percent_of(used_bytes, total_bytes),
        }
    }

    /// Placeholder for a mount point that could not be found.
    pub fn unavailable(mount_point: impl Into<String>) -> Self {
        Self::from_space("unknown", mount_point, "unknown", 0, 0)
    }
}

/// Collect usage of the filesystem mounted at `mount_point`.
pub fn collect_disk_info(disks: &Disks, mount_point: &Path) -> DiskInfo {
    let found = disks.list().iter().find(|disk| disk.mount_point() == mount_point);

    match found {
        Some(disk) => DiskInfo::from_space(
            disk.name().to_string_lossy(),
            disk.mount_point().to_string_lossy(),
            disk.file_system().to_string_lossy(),
            disk.total_space(),
            disk.available_space(),
        ),
        None => {
            debug!(mount_point = %mount_point.display(), "Mount point not found");
            DiskInfo::unavailable(mount_point.to_string_lossy())
        }
    }
}

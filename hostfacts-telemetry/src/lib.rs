//! # hostfacts Telemetry
//!
//! One-shot fact collection for a guest VM: OS identity, memory, disk,
//! network addresses, container runtimes and CPU utilization.
//!
//! ## Important: CPU Usage Measurement
//!
//! CPU usage needs two counter samples. Since the process runs once per
//! snapshot, the [`cpu::Estimator`] persists the last sample per user and
//! reuses it while it is fresh; otherwise it samples twice, one second apart.

pub mod containers;
pub mod cpu;
pub mod disk;
pub mod format;
pub mod memory;
pub mod network;
pub mod system;

use std::path::Path;
use sysinfo::{Disks, System};
use tracing::trace;

pub use containers::RuntimeInfo;
pub use disk::DiskInfo;
pub use memory::MemoryInfo;
pub use network::NetworkInfo;
pub use system::SystemInfo;

/// Collector over the `sysinfo` handles a snapshot needs.
///
/// Each handle is refreshed lazily, on first use, so a snapshot that only
/// reports memory never enumerates disks.
pub struct FactCollector {
    system: Option<System>,
    disks: Option<Disks>,
}

impl FactCollector {
    pub fn new() -> Self {
        Self {
            system: None,
            disks: None,
        }
    }

    /// OS identity, kernel and uptime.
    pub fn system_info(&self) -> SystemInfo {
        system::collect_system_info()
    }

    /// Memory and swap totals.
    pub fn memory_info(&mut self) -> MemoryInfo {
        let system = self.system.get_or_insert_with(|| {
            let mut system = System::new();
            system.refresh_memory();
            trace!("Memory statistics refreshed");
            system
        });
        memory::collect_memory_info(system)
    }

    /// Usage of the filesystem mounted at `mount_point`.
    pub fn disk_info(&mut self, mount_point: &Path) -> DiskInfo {
        let disks = self.disks.get_or_insert_with(|| {
            trace!("Disk list refreshed");
            Disks::new_with_refreshed_list()
        });
        disk::collect_disk_info(disks, mount_point)
    }

    /// Network addresses.
    pub fn network_info(&self) -> NetworkInfo {
        network::collect_network_info()
    }
}

impl Default for FactCollector {
    fn default() -> Self {
        Self::new()
    }
}

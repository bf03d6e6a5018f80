//! Snapshot assembly: runs the collectors a mode needs.

use crate::config::FactsConfig;
use hostfacts_telemetry::containers::collect_container_runtimes;
use hostfacts_telemetry::cpu::{
    detect_capabilities, Capabilities, CpuUsage, Estimator, FileStore, Identity, MeasurementPath,
    ProcStat,
};
use hostfacts_telemetry::{
    DiskInfo, FactCollector, MemoryInfo, NetworkInfo, RuntimeInfo, SystemInfo,
};
use std::path::Path;
use tracing::debug;

/// A group of related facts, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Os,
    Kernel,
    Uptime,
    Memory,
    Disk,
    Network,
    Containers,
    Cpu,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Os,
        Section::Kernel,
        Section::Uptime,
        Section::Memory,
        Section::Disk,
        Section::Network,
        Section::Containers,
        Section::Cpu,
    ];

    fn needs_system_info(&self) -> bool {
        matches!(self, Section::Os | Section::Kernel | Section::Uptime)
    }
}

/// CPU utilization together with the capability flag reported beside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuFacts {
    pub usage: CpuUsage,
    pub capabilities: Capabilities,
}

/// Collected facts. Sections that were not requested stay `None`.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub system: Option<SystemInfo>,
    pub memory: Option<MemoryInfo>,
    pub disk: Option<DiskInfo>,
    pub network: Option<NetworkInfo>,
    pub containers: Option<Vec<RuntimeInfo>>,
    pub cpu: Option<CpuFacts>,
}

/// Run the CPU estimator with the configured store and counter source.
pub async fn collect_cpu(config: &FactsConfig) -> CpuFacts {
    let source = ProcStat::new(&config.cpu.proc_stat_path);
    let capabilities = detect_capabilities(&source);

    let estimator = Estimator::new(
        source,
        FileStore::new(&config.cpu.state_dir),
        Identity::current(),
        config.estimator_config(),
    );
    let usage = estimator.estimate().await;

    debug!(
        percent = usage.percent,
        cached = usage.path == MeasurementPath::Cached,
        counters_available = capabilities.counters_available,
        "CPU facts collected"
    );

    CpuFacts {
        usage,
        capabilities,
    }
}

/// Collect every requested section.
pub async fn collect_snapshot(config: &FactsConfig, sections: &[Section]) -> Snapshot {
    let mut collector = FactCollector::new();
    let mut snapshot = Snapshot::default();

    if sections.iter().any(Section::needs_system_info) {
        snapshot.system = Some(collector.system_info());
    }

    for section in sections {
        match section {
            Section::Os | Section::Kernel | Section::Uptime => {}
            Section::Memory => snapshot.memory = Some(collector.memory_info()),
            Section::Disk => {
                snapshot.disk = Some(collector.disk_info(Path::new(&config.disk.mount_point)))
            }
            Section::Network => snapshot.network = Some(collector.network_info()),
            Section::Containers => {
                snapshot.containers = Some(
                    collect_container_runtimes(&config.containers.runtimes, config.probe_timeout())
                        .await,
                )
            }
            Section::Cpu => snapshot.cpu = Some(collect_cpu(config).await),
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> FactsConfig {
        let mut config = FactsConfig::default();
        config.cpu.state_dir = dir.path().join("state").to_string_lossy().to_string();
        config.cpu.proc_stat_path = dir.path().join("stat").to_string_lossy().to_string();
        config.cpu.sample_interval_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_only_requested_sections() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let snapshot = collect_snapshot(&config, &[Section::Kernel, Section::Memory]).await;
        assert!(snapshot.system.is_some());
        assert!(snapshot.memory.is_some());
        assert!(snapshot.disk.is_none());
        assert!(snapshot.cpu.is_none());
        assert!(snapshot.containers.is_none());
    }

    #[tokio::test]
    async fn test_cpu_without_counters() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let cpu = collect_cpu(&config).await;
        assert!(!cpu.capabilities.counters_available);
        assert_eq!(cpu.usage.formatted(), "0.0");
        assert_eq!(cpu.usage.path, MeasurementPath::DualSample);
    }

    #[tokio::test]
    async fn test_cpu_leaves_baseline_behind() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        std::fs::write(&config.cpu.proc_stat_path, "cpu  100 0 50 850 0 0 0 0 0 0\n").unwrap();

        let first = collect_cpu(&config).await;
        assert!(first.capabilities.counters_available);
        assert_eq!(first.usage.formatted(), "0.0");

        let store = FileStore::new(&config.cpu.state_dir);
        let state = std::fs::read_to_string(store.path_for(&Identity::current())).unwrap();
        assert_eq!(state, "cpu 100 0 50 850 0 0 0 0\n");

        std::fs::write(&config.cpu.proc_stat_path, "cpu  150 0 75 875 0 0 0 0 0 0\n").unwrap();
        let second = collect_cpu(&config).await;
        assert_eq!(second.usage.path, MeasurementPath::Cached);
        assert_eq!(second.usage.formatted(), "75.0");
    }
}

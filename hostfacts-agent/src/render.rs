//! Output rendering: `KEY=value` lines or a single JSON object.
//!
//! Both formats carry the same facts. Percentages are strings with a
//! trailing `%` in both, so consumers of the plain format can switch to JSON
//! without reinterpreting values.

use crate::snapshot::{Section, Snapshot};
use hostfacts_telemetry::containers::summarize;
use hostfacts_telemetry::format::format_bytes;
use hostfacts_telemetry::RuntimeInfo;
use serde::Serialize;
use std::io::Write;

/// One `KEY=value` pair.
pub type FactLine = (&'static str, String);

fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Plain lines for the given sections, in output order.
pub fn plain_lines(snapshot: &Snapshot, sections: &[Section]) -> Vec<FactLine> {
    let mut lines = Vec::new();

    for section in Section::ALL.iter().filter(|s| sections.contains(s)) {
        match section {
            Section::Os => {
                if let Some(system) = &snapshot.system {
                    lines.push(("HOSTNAME", system.hostname.clone()));
                    lines.push(("OS_NAME", system.os_name.clone()));
                    lines.push(("OS_ID", system.os_id.clone()));
                    lines.push(("OS_VERSION", system.os_version.clone()));
                }
            }
            Section::Kernel => {
                if let Some(system) = &snapshot.system {
                    lines.push(("KERNEL", system.kernel_version.clone()));
                    lines.push(("ARCH", system.architecture.clone()));
                }
            }
            Section::Uptime => {
                if let Some(system) = &snapshot.system {
                    lines.push(("UPTIME", system.uptime.clone()));
                    lines.push(("UPTIME_SECONDS", system.uptime_seconds.to_string()));
                }
            }
            Section::Memory => {
                if let Some(memory) = &snapshot.memory {
                    lines.push(("MEMORY_TOTAL", format_bytes(memory.total_bytes)));
                    lines.push(("MEMORY_USED", format_bytes(memory.used_bytes)));
                    lines.push(("MEMORY_AVAILABLE", format_bytes(memory.available_bytes)));
                    lines.push(("MEMORY_USAGE", percent(memory.usage_percent)));
                    lines.push(("SWAP_TOTAL", format_bytes(memory.swap_total_bytes)));
                    lines.push(("SWAP_USED", format_bytes(memory.swap_used_bytes)));
                }
            }
            Section::Disk => {
                if let Some(disk) = &snapshot.disk {
                    lines.push(("DISK_MOUNT", disk.mount_point.clone()));
                    lines.push(("DISK_TOTAL", format_bytes(disk.total_bytes)));
                    lines.push(("DISK_USED", format_bytes(disk.used_bytes)));
                    lines.push(("DISK_AVAILABLE", format_bytes(disk.available_bytes)));
                    lines.push(("DISK_USAGE", percent(disk.usage_percent)));
                }
            }
            Section::Network => {
                if let Some(network) = &snapshot.network {
                    let primary = network
                        .primary_or_first()
                        .map(|ip| ip.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    let all: Vec<String> =
                        network.addresses.iter().map(|a| a.address.to_string()).collect();
                    lines.push(("IP_ADDRESS", primary));
                    lines.push(("IP_ADDRESSES", all.join(",")));
                }
            }
            Section::Containers => {
                if let Some(runtimes) = &snapshot.containers {
                    lines.push(("CONTAINER_RUNTIMES", summarize(runtimes)));
                }
            }
            Section::Cpu => {
                if let Some(cpu) = &snapshot.cpu {
                    lines.push(("CPU_USAGE", format!("{}%", cpu.usage.formatted())));
                    lines.push((
                        "ENHANCED_CPU",
                        cpu.capabilities.enhanced_cpu_flag().to_string(),
                    ));
                }
            }
        }
    }

    lines
}

/// Write plain lines.
pub fn write_plain<W: Write>(out: &mut W, lines: &[FactLine]) -> std::io::Result<()> {
    for (key, value) in lines {
        writeln!(out, "{}={}", key, value)?;
    }
    Ok(())
}

/// JSON document for a full snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub hostname: Option<String>,
    pub os_name: Option<String>,
    pub os_id: Option<String>,
    pub os_version: Option<String>,
    pub kernel: Option<String>,
    pub arch: Option<String>,
    pub uptime: Option<String>,
    pub uptime_seconds: Option<u64>,
    pub memory_total: Option<u64>,
    pub memory_used: Option<u64>,
    pub memory_available: Option<u64>,
    pub memory_usage: Option<String>,
    pub swap_total: Option<u64>,
    pub swap_used: Option<u64>,
    pub disk_mount: Option<String>,
    pub disk_total: Option<u64>,
    pub disk_used: Option<u64>,
    pub disk_available: Option<u64>,
    pub disk_usage: Option<String>,
    pub ip_address: Option<String>,
    pub ip_addresses: Vec<String>,
    pub container_runtimes: Vec<RuntimeInfo>,
    pub cpu_usage: Option<String>,
    pub enhanced_cpu: Option<String>,
}

impl JsonReport {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let system = snapshot.system.as_ref();
        let memory = snapshot.memory.as_ref();
        let disk = snapshot.disk.as_ref();
        let network = snapshot.network.as_ref();
        let cpu = snapshot.cpu.as_ref();

        Self {
            hostname: system.map(|s| s.hostname.clone()),
            os_name: system.map(|s| s.os_name.clone()),
            os_id: system.map(|s| s.os_id.clone()),
            os_version: system.map(|s| s.os_version.clone()),
            kernel: system.map(|s| s.kernel_version.clone()),
            arch: system.map(|s| s.architecture.clone()),
            uptime: system.map(|s| s.uptime.clone()),
            uptime_seconds: system.map(|s| s.uptime_seconds),
            memory_total: memory.map(|m| m.total_bytes),
            memory_used: memory.map(|m| m.used_bytes),
            memory_available: memory.map(|m| m.available_bytes),
            memory_usage: memory.map(|m| percent(m.usage_percent)),
            swap_total: memory.map(|m| m.swap_total_bytes),
            swap_used: memory.map(|m| m.swap_used_bytes),
            disk_mount: disk.map(|d| d.mount_point.clone()),
            disk_total: disk.map(|d| d.total_bytes),
            disk_used: disk.map(|d| d.used_bytes),
            disk_available: disk.map(|d| d.available_bytes),
            disk_usage: disk.map(|d| percent(d.usage_percent)),
            ip_address: network.and_then(|n| n.primary_or_first()).map(|ip| ip.to_string()),
            ip_addresses: network
                .map(|n| n.addresses.iter().map(|a| a.address.to_string()).collect())
                .unwrap_or_default(),
            container_runtimes: snapshot.containers.clone().unwrap_or_default(),
            cpu_usage: cpu.map(|c| format!("{}%", c.usage.formatted())),
            enhanced_cpu: cpu.map(|c| c.capabilities.enhanced_cpu_flag().to_string()),
        }
    }
}

/// Write the snapshot as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(out: &mut W, snapshot: &Snapshot) -> std::io::Result<()> {
    let report = JsonReport::from_snapshot(snapshot);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::CpuFacts;
    use hostfacts_telemetry::cpu::{Capabilities, CpuUsage, MeasurementPath};
    use hostfacts_telemetry::MemoryInfo;

    fn cpu_snapshot(percent: f64, available: bool) -> Snapshot {
        Snapshot {
            cpu: Some(CpuFacts {
                usage: CpuUsage {
                    percent,
                    path: MeasurementPath::Cached,
                },
                capabilities: Capabilities {
                    counters_available: available,
                },
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_cpu_lines() {
        let lines = plain_lines(&cpu_snapshot(37.4, true), &[Section::Cpu]);
        assert_eq!(
            lines,
            vec![
                ("CPU_USAGE", "37.4%".to_string()),
                ("ENHANCED_CPU", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_sections_are_skipped() {
        let lines = plain_lines(&cpu_snapshot(0.0, false), &Section::ALL);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], ("CPU_USAGE", "0.0%".to_string()));
        assert_eq!(lines[1], ("ENHANCED_CPU", "false".to_string()));
    }

    #[test]
    fn test_memory_lines() {
        let snapshot = Snapshot {
            memory: Some(MemoryInfo {
                total_bytes: 2048,
                used_bytes: 1024,
                available_bytes: 1024,
                usage_percent: 50.0,
                swap_total_bytes: 0,
                swap_used_bytes: 0,
            }),
            ..Default::default()
        };
        let lines = plain_lines(&snapshot, &[Section::Memory]);
        assert_eq!(lines[0], ("MEMORY_TOTAL", "2.0K".to_string()));
        assert_eq!(lines[3], ("MEMORY_USAGE", "50.0%".to_string()));
    }

    #[test]
    fn test_write_plain() {
        let mut out = Vec::new();
        write_plain(&mut out, &plain_lines(&cpu_snapshot(75.0, true), &[Section::Cpu])).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "CPU_USAGE=75.0%\nENHANCED_CPU=true\n");
    }

    #[test]
    fn test_json_cpu_fields_are_strings() {
        let mut out = Vec::new();
        write_json(&mut out, &cpu_snapshot(75.0, false)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["cpu_usage"], "75.0%");
        assert_eq!(value["enhanced_cpu"], "false");
        assert!(value["hostname"].is_null());
    }
}

//! OS identity, kernel and uptime.

use crate::format::format_uptime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sysinfo::System;
use tracing::debug;

/// Locations of os-release, in lookup order.
pub const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

/// System information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Hostname
    pub hostname: String,
    /// Operating system display name (os-release `PRETTY_NAME`)
    pub os_name: String,
    /// Operating system identifier (os-release `ID`)
    pub os_id: String,
    /// Operating system version
    pub os_version: String,
    /// Kernel release
    pub kernel_version: String,
    /// CPU architecture
    pub architecture: String,
    /// System uptime in seconds
    pub uptime_seconds: u64,
    /// Uptime in words
    pub uptime: String,
}

/// Fields of interest from an os-release file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub name: Option<String>,
    pub pretty_name: Option<String>,
    pub id: Option<String>,
    pub version: Option<String>,
    pub version_id: Option<String>,
}

impl OsRelease {
    /// Parse `KEY=value` lines. Values may be single- or double-quoted.
    pub fn parse(content: &str) -> Self {
        let mut release = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim());
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                "NAME" => release.name = Some(value),
                "PRETTY_NAME" => release.pretty_name = Some(value),
                "ID" => release.id = Some(value),
                "VERSION" => release.version = Some(value),
                "VERSION_ID" => release.version_id = Some(value),
                _ => {}
            }
        }

        release
    }

    /// Load the first readable os-release file.
    pub fn load() -> Option<Self> {
        OS_RELEASE_PATHS.iter().find_map(|path| Self::load_from(Path::new(path)))
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(Self::parse(&content)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "os-release not readable");
                None
            }
        }
    }
}

fn unquote(value: &str) -> String {
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    stripped.replace("\\\"", "\"")
}

fn hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .or_else(System::host_name)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Collect system information.
pub fn collect_system_info() -> SystemInfo {
    let release = OsRelease::load().unwrap_or_default();
    let uptime_seconds = System::uptime();

    let os_name = release
        .pretty_name
        .or(release.name)
        .or_else(System::long_os_version)
        .unwrap_or_else(|| "unknown".to_string());
    let os_id = release
        .id
        .unwrap_or_else(System::distribution_id);
    let os_version = release
        .version_id
        .or(release.version)
        .or_else(System::os_version)
        .unwrap_or_else(|| "unknown".to_string());

    SystemInfo {
        hostname: hostname(),
        os_name,
        os_id,
        os_version,
        kernel_version: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
        architecture: std::env::consts::ARCH.to_string(),
        uptime_seconds,
        uptime: format_uptime(uptime_seconds),
    }
}

//! Container runtime detection.
//!
//! A runtime counts as installed when its binary is found on `PATH`. The
//! version is taken from `<binary> --version`, bounded by a timeout so a
//! wedged daemon client cannot stall the snapshot.

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Runtimes probed when none are configured.
pub const DEFAULT_RUNTIMES: [&str; 4] = ["docker", "podman", "containerd", "nerdctl"];

/// Default bound on a single `--version` call.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Presence of one container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub name: String,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Locate an executable named `name` in the directories of `path_var`.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Pull a version number out of a `--version` line.
///
/// `"Docker version 24.0.7, build afdd53b"` → `"24.0.7"`. Lines without a
/// numeric token are returned trimmed.
pub fn extract_version(line: &str) -> String {
    line.split_whitespace()
        .map(|token| token.trim_end_matches(',').trim_start_matches('v'))
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()) && token.contains('.'))
        .unwrap_or_else(|| line.trim())
        .to_string()
}

async fn query_version(binary: &Path, timeout: Duration) -> Option<String> {
    let output = Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, output).await {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            stdout.lines().next().map(extract_version).filter(|v| !v.is_empty())
        }
        Ok(Ok(output)) => {
            debug!(binary = %binary.display(), status = %output.status, "Version query failed");
            None
        }
        Ok(Err(e)) => {
            debug!(binary = %binary.display(), error = %e, "Failed to run version query");
            None
        }
        Err(_) => {
            debug!(
                binary = %binary.display(),
                timeout_ms = timeout.as_millis() as u64,
                "Version query timed out"
            );
            None
        }
    }
}

/// Probe a single runtime.
pub async fn probe_runtime(name: &str, path_var: &OsStr, timeout: Duration) -> RuntimeInfo {
    match find_in_path(name, path_var) {
        Some(binary) => RuntimeInfo {
            name: name.to_string(),
            installed: true,
            version: query_version(&binary, timeout).await,
        },
        None => RuntimeInfo {
            name: name.to_string(),
            installed: false,
            version: None,
        },
    }
}

/// Probe each runtime in turn using the process `PATH`.
pub async fn collect_container_runtimes(names: &[String], timeout: Duration) -> Vec<RuntimeInfo> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let mut runtimes = Vec::with_capacity(names.len());

    for name in names {
        runtimes.push(probe_runtime(name, &path_var, timeout).await);
    }

    debug!(
        installed = runtimes.iter().filter(|r| r.installed).count(),
        probed = runtimes.len(),
        "Container runtimes probed"
    );

    runtimes
}

/// `"docker 24.0.7,podman"` style summary of installed runtimes, or `"none"`.
pub fn summarize(runtimes: &[RuntimeInfo]) -> String {
    let installed: Vec<String> = runtimes
        .iter()
        .filter(|r| r.installed)
        .map(|r| match &r.version {
            Some(version) => format!("{} {}", r.name, version),
            None => r.name.clone(),
        })
        .collect();

    if installed.is_empty() {
        "none".to_string()
    } else {
        installed.join(",")
    }
}

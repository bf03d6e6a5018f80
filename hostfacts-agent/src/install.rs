//! `install` mode: prepare a host for cheap repeated snapshots.
//!
//! Writes the default configuration when none exists, creates the state
//! directory and seeds the caller's CPU baseline so the first real snapshot
//! can take the cached path instead of sleeping.

use crate::config::FactsConfig;
use crate::error::{FactsError, FactsResult};
use crate::render::FactLine;
use hostfacts_telemetry::cpu::{CounterSource, FileStore, Identity, ProcStat, SampleStore};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What `install` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub config_path: PathBuf,
    /// False when an existing configuration was left untouched
    pub config_written: bool,
    /// Seeded baseline, or `None` when the host has no CPU counters
    pub state_path: Option<PathBuf>,
}

impl InstallReport {
    pub fn lines(&self) -> Vec<FactLine> {
        vec![
            ("INSTALLED_CONFIG", self.config_path.display().to_string()),
            (
                "CONFIG_WRITTEN",
                if self.config_written { "true" } else { "false" }.to_string(),
            ),
            (
                "INSTALLED_STATE",
                self.state_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unavailable".to_string()),
            ),
        ]
    }
}

/// Run the install steps.
pub fn run_install(config: &FactsConfig, config_path: &Path) -> FactsResult<InstallReport> {
    let config_written = if config_path.exists() {
        info!(path = %config_path.display(), "Keeping existing configuration");
        false
    } else {
        config
            .save_to_path(config_path)
            .map_err(|e| {
                FactsError::config_write_failed(&config_path.display().to_string(), &e.to_string())
            })?;
        true
    };

    let state_dir = Path::new(&config.cpu.state_dir);
    std::fs::create_dir_all(state_dir)
        .map_err(|e| FactsError::state_dir_failed(&config.cpu.state_dir, &e.to_string()))?;

    let source = ProcStat::new(&config.cpu.proc_stat_path);
    let store = FileStore::new(state_dir);
    let identity = Identity::current();

    let state_path = match source.read_sample() {
        Some(sample) => {
            store
                .store(&identity, &sample)
                .map_err(|e| FactsError::state_seed_failed(&e.to_string()))?;
            let path = store.path_for(&identity);
            info!(path = %path.display(), identity = %identity, "Seeded CPU baseline");
            Some(path)
        }
        None => {
            let err = FactsError::counters_unavailable(&config.cpu.proc_stat_path);
            warn!(code = %err.code_string(), error = %err, "Skipping CPU baseline");
            None
        }
    };

    Ok(InstallReport {
        config_path: config_path.to_path_buf(),
        config_written,
        state_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> FactsConfig {
        let mut config = FactsConfig::default();
        config.cpu.state_dir = dir.path().join("state").to_string_lossy().to_string();
        config.cpu.proc_stat_path = dir.path().join("stat").to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_install_seeds_baseline() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        std::fs::write(&config.cpu.proc_stat_path, "cpu  9 8 7 6 5 4 3 2 1 0\n").unwrap();
        let config_path = dir.path().join("etc").join("hostfacts.yaml");

        let report = run_install(&config, &config_path).unwrap();
        assert!(report.config_written);
        assert!(config_path.exists());

        let state = std::fs::read_to_string(report.state_path.unwrap()).unwrap();
        assert_eq!(state, "cpu 9 8 7 6 5 4 3 2\n");
    }

    #[test]
    fn test_install_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let config_path = dir.path().join("hostfacts.yaml");
        std::fs::write(&config_path, "log_level: debug\n").unwrap();

        let report = run_install(&config, &config_path).unwrap();
        assert!(!report.config_written);
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "log_level: debug\n");
        // No counter file in the temp dir
        assert!(report.state_path.is_none());
        assert_eq!(report.lines()[2], ("INSTALLED_STATE", "unavailable".to_string()));
    }
}

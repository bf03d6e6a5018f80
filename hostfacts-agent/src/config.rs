//! Configuration management for hostfacts.
//!
//! Supports loading configuration from YAML files with sensible defaults.
//! The default location is `/etc/hostfacts/hostfacts.yaml`; a missing file
//! means defaults.

use hostfacts_common::{is_valid_level, LogFormat, VALID_LEVELS};
use hostfacts_telemetry::containers::{DEFAULT_PROBE_TIMEOUT, DEFAULT_RUNTIMES};
use hostfacts_telemetry::cpu::{
    EstimatorConfig, DEFAULT_FRESHNESS_THRESHOLD, DEFAULT_PROC_STAT_PATH, DEFAULT_SAMPLE_INTERVAL,
};
use hostfacts_telemetry::disk::DEFAULT_MOUNT_POINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/hostfacts/hostfacts.yaml";

/// Longest accepted dual-sample wait.
const MAX_SAMPLE_INTERVAL_MS: u64 = 60_000;

/// hostfacts configuration loaded from YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FactsConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log format of the stderr stream (json, pretty)
    pub log_format: LogFormat,

    /// Path to log file (empty = stderr only)
    pub log_file: String,

    /// CPU utilization estimator
    pub cpu: CpuConfig,

    /// Disk usage reporting
    pub disk: DiskConfig,

    /// Container runtime detection
    pub containers: ContainerConfig,
}

/// CPU estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Directory holding the per-user baseline files
    pub state_dir: String,

    /// Kernel CPU counter file
    pub proc_stat_path: String,

    /// Baselines older than this are not reused
    pub freshness_threshold_secs: u64,

    /// Wait between the two samples when no fresh baseline exists
    pub sample_interval_ms: u64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            state_dir: std::env::temp_dir().to_string_lossy().to_string(),
            proc_stat_path: DEFAULT_PROC_STAT_PATH.to_string(),
            freshness_threshold_secs: DEFAULT_FRESHNESS_THRESHOLD.as_secs(),
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
        }
    }
}

/// Disk reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Mount point whose usage is reported
    pub mount_point: String,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
        }
    }
}

/// Container runtime detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Runtime binaries looked up on PATH
    pub runtimes: Vec<String>,

    /// Timeout for each `--version` query in milliseconds
    pub probe_timeout_ms: u64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtimes: DEFAULT_RUNTIMES.iter().map(|r| r.to_string()).collect(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::Pretty,
            log_file: String::new(), // Empty = stderr only
            cpu: CpuConfig::default(),
            disk: DiskConfig::default(),
            containers: ContainerConfig::default(),
        }
    }
}

impl FactsConfig {
    /// Load configuration from the default path or create default config
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path, falling back to defaults
    /// when the file is missing or unusable.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        }

        match Self::load_strict(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load config file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Load configuration from a file that must exist and parse.
    pub fn load_strict(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load an explicit config path for `install`.
    ///
    /// A missing file yields defaults, which `install` then writes there. An
    /// existing file must still parse.
    pub fn load_for_install(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_strict(path)
        } else {
            info!(path = %path.display(), "Config file not found, installing defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file (useful for generating default config)
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_level(&self.log_level) {
            return Err(ConfigError::InvalidValue {
                field: "log_level".to_string(),
                message: format!("must be one of: {:?}", VALID_LEVELS),
            });
        }

        if self.cpu.state_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cpu.state_dir".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.cpu.freshness_threshold_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cpu.freshness_threshold_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.cpu.sample_interval_ms > MAX_SAMPLE_INTERVAL_MS {
            return Err(ConfigError::InvalidValue {
                field: "cpu.sample_interval_ms".to_string(),
                message: format!("must be at most {}", MAX_SAMPLE_INTERVAL_MS),
            });
        }

        if self.disk.mount_point.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "disk.mount_point".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.containers.probe_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "containers.probe_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Estimator tuning derived from the `cpu` section
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            freshness_threshold: Duration::from_secs(self.cpu.freshness_threshold_secs),
            sample_interval: Duration::from_millis(self.cpu.sample_interval_ms),
        }
    }

    /// Log file path, if file logging is enabled
    pub fn log_file_path(&self) -> Option<PathBuf> {
        if self.log_file.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.log_file))
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.containers.probe_timeout_ms)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FactsConfig::default();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.cpu.freshness_threshold_secs, 30);
        assert_eq!(config.cpu.sample_interval_ms, 1000);
        assert_eq!(config.disk.mount_point, "/");
        assert_eq!(config.containers.runtimes.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = FactsConfig::default();

        config.cpu.freshness_threshold_secs = 0;
        assert!(config.validate().is_err());
        config.cpu.freshness_threshold_secs = 30;

        config.cpu.sample_interval_ms = MAX_SAMPLE_INTERVAL_MS + 1;
        assert!(config.validate().is_err());
        config.cpu.sample_interval_ms = 0;
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_level = "info".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_estimator_config() {
        let mut config = FactsConfig::default();
        assert_eq!(config.estimator_config(), EstimatorConfig::default());

        config.cpu.freshness_threshold_secs = 10;
        config.cpu.sample_interval_ms = 250;
        let estimator = config.estimator_config();
        assert_eq!(estimator.freshness_threshold, Duration::from_secs(10));
        assert_eq!(estimator.sample_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etc").join("hostfacts.yaml");

        let mut config = FactsConfig::default();
        config.disk.mount_point = "/data".to_string();
        config.save_to_path(&path).unwrap();

        let loaded = FactsConfig::load_strict(&path).unwrap();
        assert_eq!(loaded.disk.mount_point, "/data");
    }

    #[test]
    fn test_install_load_accepts_missing_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etc").join("hostfacts.yaml");

        assert!(FactsConfig::load_strict(&path).is_err());
        assert_eq!(FactsConfig::load_for_install(&path).unwrap().log_level, "warn");

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "cpu: [not, a, map]\n").unwrap();
        assert!(FactsConfig::load_for_install(&path).is_err());
    }

    #[test]
    fn test_lenient_load_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hostfacts.yaml");

        assert_eq!(FactsConfig::load_from_path(&path).log_level, "warn");

        std::fs::write(&path, "cpu: [not, a, map]\n").unwrap();
        assert_eq!(FactsConfig::load_from_path(&path).cpu.freshness_threshold_secs, 30);
        assert!(FactsConfig::load_strict(&path).is_err());
    }
}

//! # hostfacts Error Codes
//!
//! Fatal errors are reported with a stable code of the form `HFX-XXXX`.
//! Collection itself never fails: missing sources, unparseable values and
//! persistence problems all degrade to fallback values. Only configuration
//! and `install` problems end the process.
//!
//! ## Error Code Ranges
//!
//! | Range     | Category      |
//! |-----------|---------------|
//! | 1000-1999 | Configuration |
//! | 2000-2999 | Persistence   |
//! | 3000-3999 | Collection    |
//! | 9000-9999 | Internal      |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code type alias
pub type ErrorCode = u16;

/// Fatal error with structured error code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactsError {
    /// Error code (HFX-XXXX format)
    pub code: ErrorCode,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable error name
    pub name: String,
    /// Detailed error message
    pub message: String,
    /// Suggested resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl fmt::Display for FactsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HFX-{:04}: {} - {}", self.code, self.name, self.message)
    }
}

impl std::error::Error for FactsError {}

/// Error category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Persistence,
    Collection,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "Configuration"),
            ErrorCategory::Persistence => write!(f, "Persistence"),
            ErrorCategory::Collection => write!(f, "Collection"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

// ============================================================================
// Error Code Constants
// ============================================================================

/// Configuration Errors (1000-1999)
pub mod configuration {
    use super::*;

    pub const CONFIG_LOAD_FAILED: ErrorCode = 1001;
    pub const CONFIG_INVALID: ErrorCode = 1002;
    pub const CONFIG_WRITE_FAILED: ErrorCode = 1003;
    pub const LOGGING_INIT_FAILED: ErrorCode = 1004;
}

/// Persistence Errors (2000-2999)
pub mod persistence {
    use super::*;

    pub const STATE_DIR_FAILED: ErrorCode = 2001;
    pub const STATE_SEED_FAILED: ErrorCode = 2002;
}

/// Collection Errors (3000-3999)
pub mod collection {
    use super::*;

    pub const COUNTERS_UNAVAILABLE: ErrorCode = 3001;
}

// ============================================================================
// Error Builder
// ============================================================================

impl FactsError {
    /// Create a new error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let (category, name) = Self::code_info(code);
        Self {
            code,
            category,
            name,
            message: message.into(),
            resolution: None,
        }
    }

    /// Add resolution suggestion to the error
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    /// Get category and name for an error code
    fn code_info(code: ErrorCode) -> (ErrorCategory, String) {
        match code {
            1001 => (ErrorCategory::Configuration, "CONFIG_LOAD_FAILED".into()),
            1002 => (ErrorCategory::Configuration, "CONFIG_INVALID".into()),
            1003 => (ErrorCategory::Configuration, "CONFIG_WRITE_FAILED".into()),
            1004 => (ErrorCategory::Configuration, "LOGGING_INIT_FAILED".into()),

            2001 => (ErrorCategory::Persistence, "STATE_DIR_FAILED".into()),
            2002 => (ErrorCategory::Persistence, "STATE_SEED_FAILED".into()),

            3001 => (ErrorCategory::Collection, "COUNTERS_UNAVAILABLE".into()),

            _ => (ErrorCategory::Internal, "UNKNOWN_ERROR".into()),
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"message":"{}"}}"#, self.code, self.message)
        })
    }

    /// Get the full error code string (HFX-XXXX)
    pub fn code_string(&self) -> String {
        format!("HFX-{:04}", self.code)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl FactsError {
    pub fn config_load_failed(path: &str, err: &str) -> Self {
        Self::new(
            configuration::CONFIG_LOAD_FAILED,
            format!("Failed to load config from {}: {}", path, err),
        )
        .with_resolution("Fix the YAML syntax or omit --config to use defaults")
    }

    pub fn config_invalid(err: &str) -> Self {
        Self::new(configuration::CONFIG_INVALID, format!("Invalid configuration: {}", err))
    }

    pub fn config_write_failed(path: &str, err: &str) -> Self {
        Self::new(
            configuration::CONFIG_WRITE_FAILED,
            format!("Failed to write config to {}: {}", path, err),
        )
        .with_resolution("Run install with permission to write the config directory")
    }

    pub fn logging_init_failed(err: &str) -> Self {
        Self::new(
            configuration::LOGGING_INIT_FAILED,
            format!("Failed to initialize logging: {}", err),
        )
        .with_resolution("Check log_file in hostfacts.yaml")
    }

    pub fn state_dir_failed(path: &str, err: &str) -> Self {
        Self::new(
            persistence::STATE_DIR_FAILED,
            format!("Failed to create state directory {}: {}", path, err),
        )
        .with_resolution("Check cpu.state_dir in hostfacts.yaml")
    }

    pub fn state_seed_failed(err: &str) -> Self {
        Self::new(persistence::STATE_SEED_FAILED, format!("Failed to seed CPU baseline: {}", err))
    }

    pub fn counters_unavailable(path: &str) -> Self {
        Self::new(
            collection::COUNTERS_UNAVAILABLE,
            format!("CPU counters unavailable at {}", path),
        )
        .with_resolution("Mount procfs or set cpu.proc_stat_path")
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type for fatal hostfacts operations
pub type FactsResult<T> = Result<T, FactsError>;

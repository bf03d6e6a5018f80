//! Platform counter sources.

use super::sample::CpuSample;
use std::path::PathBuf;
use tracing::debug;

/// Default location of the kernel CPU counters.
pub const DEFAULT_PROC_STAT_PATH: &str = "/proc/stat";

/// Something that can capture the aggregate CPU counters right now.
pub trait CounterSource {
    /// Capture a sample, or `None` when the counter interface is unavailable.
    fn read_sample(&self) -> Option<CpuSample>;
}

/// Reads the aggregate row of a `/proc/stat`-formatted file.
#[derive(Debug, Clone)]
pub struct ProcStat {
    path: PathBuf,
}

impl ProcStat {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcStat {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_STAT_PATH)
    }
}

impl CounterSource for ProcStat {
    fn read_sample(&self) -> Option<CpuSample> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "CPU counters unavailable");
                return None;
            }
        };

        let sample = CpuSample::from_proc_stat(&content);
        if sample.is_none() {
            debug!(path = %self.path.display(), "No aggregate cpu row in counter file");
        }
        sample
    }
}

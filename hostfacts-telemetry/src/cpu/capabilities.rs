//! Host capability detection.

use super::source::CounterSource;
use serde::{Deserialize, Serialize};

/// What the estimator can measure on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Kernel CPU counters are readable, so utilization is measured rather
    /// than reported as zero.
    pub counters_available: bool,
}

impl Capabilities {
    /// Boolean rendered as a string, as reported in snapshots.
    pub fn enhanced_cpu_flag(&self) -> &'static str {
        if self.counters_available {
            "true"
        } else {
            "false"
        }
    }
}

/// Probe the counter source once.
pub fn detect_capabilities(source: &impl CounterSource) -> Capabilities {
    Capabilities {
        counters_available: source.read_sample().is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::source::ProcStat;
    use tempfile::TempDir;

    #[test]
    fn test_detects_missing_counters() {
        let dir = TempDir::new().unwrap();
        let caps = detect_capabilities(&ProcStat::new(dir.path().join("missing")));
        assert!(!caps.counters_available);
        assert_eq!(caps.enhanced_cpu_flag(), "false");
    }

    #[test]
    fn test_detects_counters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stat");
        std::fs::write(&path, "cpu 1 2 3 4 5 6 7 8 0 0\n").unwrap();

        let caps = detect_capabilities(&ProcStat::new(&path));
        assert!(caps.counters_available);
        assert_eq!(caps.enhanced_cpu_flag(), "true");
    }
}

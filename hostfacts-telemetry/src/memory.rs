//! Memory information collection.

use crate::format::percent_of;
use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Memory information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total physical memory in bytes
    pub total_bytes: u64,
    /// Used memory in bytes
    pub used_bytes: u64,
    /// Available memory in bytes
    pub available_bytes: u64,
    /// Memory usage percentage, one decimal
    pub usage_percent: f64,
    /// Total swap in bytes
    pub swap_total_bytes: u64,
    /// Used swap in bytes
    pub swap_used_bytes: u64,
}

/// Collect memory information from a memory-refreshed `System`.
pub fn collect_memory_info(system: &System) -> MemoryInfo {
    let total = system.total_memory();
    let used = system.used_memory();

    MemoryInfo {
        total_bytes: total,
        used_bytes: used,
        available_bytes: system.available_memory(),
        usage_percent: percent_of(used, total),
        swap_total_bytes: system.total_swap(),
        swap_used_bytes: system.used_swap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_memory_info() {
        let mut system = System::new();
        system.refresh_memory();

        let info = collect_memory_info(&system);
        assert!(info.used_bytes <= info.total_bytes);
        assert!((0.0..=100.0).contains(&info.usage_percent));
    }
}

//! Aggregate CPU counter samples and the utilization derivation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading token of the aggregate row in `/proc/stat` and of the state file.
pub const CPU_ROW_MARKER: &str = "cpu";

/// Cumulative CPU counters since boot, in ticks.
///
/// Values come from the aggregate `cpu` row of `/proc/stat`. `guest` and
/// `guest_nice` are kept for completeness but do not enter the derivation
/// (the kernel already accounts them inside `user` and `nice`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSample {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuSample {
    /// Find the aggregate `cpu` row in `/proc/stat` content and parse it.
    ///
    /// Returns `None` when no aggregate row is present. Per-core rows
    /// (`cpu0`, `cpu1`, ...) are skipped.
    pub fn from_proc_stat(content: &str) -> Option<Self> {
        content.lines().find_map(Self::parse_row)
    }

    /// Parse a single row of the form `cpu <user> <nice> <system> ...`.
    ///
    /// Fields that are missing or fail to parse become zero. Returns `None`
    /// only when the row does not start with the aggregate marker.
    pub fn parse_row(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        if parts.next()? != CPU_ROW_MARKER {
            return None;
        }

        let fields: Vec<&str> = parts.collect();
        let field =
            |idx: usize| -> u64 { fields.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        Some(Self {
            user: field(0),
            nice: field(1),
            system: field(2),
            idle: field(3),
            iowait: field(4),
            irq: field(5),
            softirq: field(6),
            steal: field(7),
            guest: field(8),
            guest_nice: field(9),
        })
    }

    /// Ticks spent doing work.
    pub fn active(&self) -> u128 {
        [self.user, self.nice, self.system, self.irq, self.softirq, self.steal]
            .iter()
            .map(|&v| v as u128)
            .sum()
    }

    /// Ticks spent idle, including time waiting on I/O.
    pub fn idle_total(&self) -> u128 {
        self.idle as u128 + self.iowait as u128
    }

    /// Render the single-line state file representation.
    pub fn to_state_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for CpuSample {
    /// `cpu user nice system idle iowait irq softirq steal`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            CPU_ROW_MARKER,
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal
        )
    }
}

/// Counter movement between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuDelta {
    /// Change in active ticks. Negative after a counter reset.
    pub total_delta: i128,
    /// Change in idle + iowait ticks.
    pub idle_delta: i128,
}

impl CpuDelta {
    pub fn between(previous: &CpuSample, current: &CpuSample) -> Self {
        Self {
            total_delta: current.active() as i128 - previous.active() as i128,
            idle_delta: current.idle_total() as i128 - previous.idle_total() as i128,
        }
    }

    /// Utilization percentage, rounded to one decimal.
    ///
    /// Always finite and within `0.0..=100.0`.
    pub fn utilization(&self) -> f64 {
        if self.total_delta <= 0 {
            return 0.0;
        }

        let denominator = self.total_delta + self.idle_delta;
        if denominator <= 0 {
            return 0.0;
        }

        let percent = self.total_delta as f64 / denominator as f64 * 100.0;
        round_one_decimal(percent.clamp(0.0, 100.0))
    }
}

/// Round to one fractional digit.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_STAT: &str = "\
cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0
cpu0 1393280 32966 572056 13343292 6130 0 17875 0 23933 0
cpu1 1335180 34137 564024 13402390 3539 0 2364 0 28441 0
intr 1462898 115 0 0 0
ctxt 1990473
btime 1062191376
";

    fn sample(user: u64, system: u64, idle: u64) -> CpuSample {
        CpuSample {
            user,
            system,
            idle,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_aggregate_row() {
        let parsed = CpuSample::from_proc_stat(PROC_STAT).unwrap();
        assert_eq!(parsed.user, 10132153);
        assert_eq!(parsed.nice, 290696);
        assert_eq!(parsed.system, 3084719);
        assert_eq!(parsed.idle, 46828483);
        assert_eq!(parsed.iowait, 16683);
        assert_eq!(parsed.softirq, 25195);
        assert_eq!(parsed.guest, 175628);
    }

    #[test]
    fn test_per_core_rows_are_not_aggregate() {
        assert!(CpuSample::parse_row("cpu0 1 2 3 4").is_none());
        assert!(CpuSample::from_proc_stat("cpu0 1 2 3 4\nintr 5\n").is_none());
    }

    #[test]
    fn test_malformed_fields_default_to_zero() {
        let parsed = CpuSample::parse_row("cpu 100 abc 50 -3").unwrap();
        assert_eq!(parsed.user, 100);
        assert_eq!(parsed.nice, 0);
        assert_eq!(parsed.system, 50);
        assert_eq!(parsed.idle, 0);
        assert_eq!(parsed.steal, 0);
    }

    #[test]
    fn test_state_line_field_order() {
        let s = CpuSample {
            user: 1,
            nice: 2,
            system: 3,
            idle: 4,
            iowait: 5,
            irq: 6,
            softirq: 7,
            steal: 8,
            guest: 9,
            guest_nice: 10,
        };
        assert_eq!(s.to_state_line(), "cpu 1 2 3 4 5 6 7 8\n");
    }

    #[test]
    fn test_reference_delta() {
        let prev = sample(100, 50, 850);
        let curr = sample(150, 75, 875);
        let delta = CpuDelta::between(&prev, &curr);

        assert_eq!(delta.total_delta, 75);
        assert_eq!(delta.idle_delta, 25);
        assert_eq!(delta.utilization(), 75.0);
    }

    #[test]
    fn test_no_activity_is_zero() {
        let s = sample(100, 50, 850);
        assert_eq!(CpuDelta::between(&s, &s).utilization(), 0.0);

        // Idle time moved but no active ticks
        let later = sample(100, 50, 900);
        assert_eq!(CpuDelta::between(&s, &later).utilization(), 0.0);
    }

    #[test]
    fn test_no_idle_is_full() {
        let prev = sample(100, 50, 850);
        let curr = sample(130, 60, 850);
        assert_eq!(CpuDelta::between(&prev, &curr).utilization(), 100.0);
    }

    #[test]
    fn test_counter_reset_is_zero() {
        let prev = sample(u64::MAX, u64::MAX, u64::MAX);
        let curr = sample(10, 10, 10);
        let delta = CpuDelta::between(&prev, &curr);
        assert!(delta.total_delta < 0);
        assert_eq!(delta.utilization(), 0.0);
    }

    #[test]
    fn test_rounding() {
        // 1 / 3 active
        let prev = sample(0, 0, 0);
        let curr = sample(1, 0, 2);
        assert_eq!(CpuDelta::between(&prev, &curr).utilization(), 33.3);
    }
}

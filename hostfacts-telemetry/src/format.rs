//! Human-readable renderings shared by the collectors.

const UNITS: [&str; 6] = ["K", "M", "G", "T", "P", "E"];

/// Format a byte count with a binary unit suffix, `df -h` style.
///
/// `512` → `"512B"`, `1536` → `"1.5K"`, `16_777_216_000` → `"15.6G"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1}{}", value, UNITS[unit])
}

/// Percentage of `part` in `total`, rounded to one decimal. Zero total is 0.0.
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    crate::cpu::sample::round_one_decimal(part as f64 / total as f64 * 100.0)
}

/// Format an uptime like `uptime -p`: `"3 days, 4 hours, 5 minutes"`.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    let parts: Vec<String> = [(days, "day"), (hours, "hour"), (minutes, "minute")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" }))
        .collect();

    if parts.is_empty() {
        "0 minutes".to_string()
    } else {
        parts.join(", ")
    }
}

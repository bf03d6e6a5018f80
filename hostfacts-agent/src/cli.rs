//! Command-line argument parsing.

use crate::snapshot::Section;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// hostfacts - point-in-time guest telemetry snapshot
#[derive(Parser, Debug)]
#[command(name = "hostfacts")]
#[command(about = "Point-in-time host telemetry snapshot for virtual machines")]
#[command(version)]
pub struct Args {
    /// What to report
    #[arg(value_enum)]
    pub mode: Option<Mode>,

    /// Path to configuration file (defaults used if omitted and the default file is absent)
    #[arg(short, long, env = "HOSTFACTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

/// Output mode selected by the positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Every fact as KEY=value lines
    #[default]
    All,
    /// Every fact as one JSON object
    Json,
    /// Hostname and OS identity
    Os,
    /// Kernel release and architecture
    Kernel,
    /// System uptime
    Uptime,
    /// Memory and swap usage
    Memory,
    /// Disk usage of the configured mount point
    Disk,
    /// IP addresses
    Network,
    /// CPU utilization
    Cpu,
    /// Installed container runtimes
    Containers,
    /// Write the default config and seed the CPU baseline
    Install,
}

impl Mode {
    /// Fact sections reported by this mode.
    pub fn sections(&self) -> &'static [Section] {
        match self {
            Mode::All | Mode::Json => &Section::ALL,
            Mode::Os => &[Section::Os],
            Mode::Kernel => &[Section::Kernel],
            Mode::Uptime => &[Section::Uptime],
            Mode::Memory => &[Section::Memory],
            Mode::Disk => &[Section::Disk],
            Mode::Network => &[Section::Network],
            Mode::Cpu => &[Section::Cpu],
            Mode::Containers => &[Section::Containers],
            Mode::Install => &[],
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Mode::Json)
    }
}

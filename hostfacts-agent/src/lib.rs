//! # hostfacts Agent
//!
//! Library side of the `hostfacts` binary: configuration, the snapshot
//! assembly, rendering and the `install` mode.
//!
//! ## Output
//! - Plain: one `KEY=value` line per fact on stdout
//! - JSON: one object with the same facts
//!
//! Diagnostics never reach stdout; see [`hostfacts_common::init_logging`].

pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod render;
pub mod snapshot;

pub use config::FactsConfig;
pub use error::{ErrorCategory, FactsError, FactsResult};
pub use snapshot::{collect_snapshot, Section, Snapshot};

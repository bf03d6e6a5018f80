//! # hostfacts Common
//!
//! Shared utilities for the hostfacts components.
//!
//! ## Logging
//!
//! ```no_run
//! use hostfacts_common::{init_logging, LogFormat};
//!
//! // Diagnostics go to stderr; stdout is reserved for the snapshot.
//! init_logging("debug", LogFormat::Pretty, None).unwrap();
//! tracing::debug!("collector started");
//! ```

pub mod logging;

pub use logging::{init_logging, is_valid_level, LogFormat, VALID_LEVELS};

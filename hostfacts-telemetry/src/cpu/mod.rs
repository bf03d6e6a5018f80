//! CPU utilization estimation.
//!
//! Utilization is derived from the aggregate `/proc/stat` row. A baseline
//! sample is persisted per user between invocations so that repeated polling
//! (for example by a UI refreshing every few seconds) costs one read. When no
//! fresh baseline exists the estimator samples twice, one second apart.

pub mod capabilities;
pub mod estimator;
pub mod sample;
pub mod source;
pub mod store;

pub use capabilities::{detect_capabilities, Capabilities};
pub use estimator::{
    is_fresh, CpuUsage, Estimator, EstimatorConfig, MeasurementPath, DEFAULT_FRESHNESS_THRESHOLD,
    DEFAULT_SAMPLE_INTERVAL,
};
pub use sample::{CpuDelta, CpuSample, CPU_ROW_MARKER};
pub use source::{CounterSource, ProcStat, DEFAULT_PROC_STAT_PATH};
pub use store::{
    parse_state, FileStore, Identity, MemoryStore, SampleStore, StateError, StoredSample,
};

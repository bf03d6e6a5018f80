//! CPU utilization since the previous invocation.
//!
//! A fresh baseline left by an earlier run gives a cheap single-sample
//! answer. Without one, two samples are taken `sample_interval` apart.

use super::sample::CpuDelta;
use super::source::CounterSource;
use super::store::{Identity, SampleStore, StoredSample};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Maximum baseline age still used for the cached path.
pub const DEFAULT_FRESHNESS_THRESHOLD: Duration = Duration::from_secs(30);

/// Wait between the two samples of a dual-sample measurement.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Estimator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub freshness_threshold: Duration,
    pub sample_interval: Duration,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            freshness_threshold: DEFAULT_FRESHNESS_THRESHOLD,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

/// Which way the previous sample was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementPath {
    /// Previous sample came from a fresh persisted baseline.
    Cached,
    /// Two samples taken in this invocation.
    DualSample,
}

/// Result of one estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuUsage {
    /// Percentage in `0.0..=100.0`, one decimal.
    pub percent: f64,
    pub path: MeasurementPath,
}

impl CpuUsage {
    /// Percentage with exactly one fractional digit, e.g. `"37.4"`.
    pub fn formatted(&self) -> String {
        format!("{:.1}", self.percent)
    }
}

/// Whether a baseline written at `stored_at` is still fresh at `now`.
///
/// A timestamp in the future is never fresh.
pub fn is_fresh(stored_at: SystemTime, now: SystemTime, threshold: Duration) -> bool {
    match now.duration_since(stored_at) {
        Ok(age) => age < threshold,
        Err(_) => false,
    }
}

/// Estimates utilization from a counter source and a baseline store.
pub struct Estimator<C, S> {
    source: C,
    store: S,
    identity: Identity,
    config: EstimatorConfig,
}

impl<C: CounterSource, S: SampleStore> Estimator<C, S> {
    pub fn new(source: C, store: S, identity: Identity, config: EstimatorConfig) -> Self {
        Self {
            source,
            store,
            identity,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Estimate utilization and refresh the baseline.
    ///
    /// Never fails: unavailable counters read as zero and persistence errors
    /// are only logged.
    pub async fn estimate(&self) -> CpuUsage {
        let baseline = self.fresh_baseline();

        let (previous, current, path) = match baseline {
            Some(stored) => {
                let current = self.source.read_sample();
                debug!(identity = %self.identity, "Using cached CPU baseline");
                (stored.sample, current, MeasurementPath::Cached)
            }
            None => {
                debug!(
                    identity = %self.identity,
                    interval_ms = self.config.sample_interval.as_millis() as u64,
                    "No fresh CPU baseline, taking dual sample"
                );
                let first = self.source.read_sample();
                tokio::time::sleep(self.config.sample_interval).await;
                let second = self.source.read_sample();
                // A failed first read must not turn the second into a since-boot average
                (first.or(second).unwrap_or_default(), second, MeasurementPath::DualSample)
            }
        };

        let delta = CpuDelta::between(&previous, &current.unwrap_or_default());
        let percent = delta.utilization();

        debug!(
            path = ?path,
            prev_active = %previous.active(),
            prev_idle = %previous.idle_total(),
            total_delta = %delta.total_delta,
            idle_delta = %delta.idle_delta,
            percent = percent,
            "CPU utilization computed"
        );

        // Only a successful capture becomes the next baseline
        if let Some(current) = current {
            if let Err(e) = self.store.store(&self.identity, &current) {
                warn!(identity = %self.identity, error = %e, "Failed to persist CPU baseline");
            }
        }

        CpuUsage { percent, path }
    }

    fn fresh_baseline(&self) -> Option<StoredSample> {
        let stored = self.store.load(&self.identity)?;
        let now = SystemTime::now();

        if is_fresh(stored.stored_at, now, self.config.freshness_threshold) {
            Some(stored)
        } else {
            debug!(
                identity = %self.identity,
                age_secs = now.duration_since(stored.stored_at).map(|d| d.as_secs()).ok(),
                threshold_secs = self.config.freshness_threshold.as_secs(),
                "CPU baseline is stale"
            );
            None
        }
    }
}

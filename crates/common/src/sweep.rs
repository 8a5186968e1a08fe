//! # Staleness Sweep
//!
//! Background task that periodically drops agents which stopped
//! reporting. It is the only writer to the location store that runs
//! outside a request; the store's lock is the sole ordering guarantee
//! between a sweep and a concurrent request.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::location::LocationStore;

/// Sweep timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Time between sweeps
    pub interval: Duration,
    /// Records last updated longer ago than this are evicted
    pub max_age: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(30_000),
            max_age: Duration::from_millis(60_000),
        }
    }
}

impl SweepConfig {
    fn max_age_delta(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.max_age).unwrap_or(chrono::Duration::MAX)
    }
}

/// Run one sweep against `store` as of `now`, returning the evicted ids
pub fn run_sweep_once(store: &LocationStore, config: &SweepConfig, now: DateTime<Utc>) -> Vec<String> {
    let evicted = store.evict_stale(now, config.max_age_delta());
    if evicted.is_empty() {
        debug!(remaining = store.len(), "Staleness sweep found nothing to evict");
    } else {
        info!(evicted = ?evicted, remaining = store.len(), "Evicted stale locations");
    }
    evicted
}

/// Start the periodic sweep.
///
/// The first sweep runs one full interval after start. The task runs
/// until the returned handle is aborted or the runtime shuts down.
pub fn spawn_staleness_sweep(store: Arc<LocationStore>, config: SweepConfig) -> JoinHandle<()> {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() completes its first tick immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            run_sweep_once(&store, &config, Utc::now());
        }
    });

    info!(
        interval_ms = config.interval.as_millis() as u64,
        max_age_ms = config.max_age.as_millis() as u64,
        "Staleness sweep started"
    );
    handle
}

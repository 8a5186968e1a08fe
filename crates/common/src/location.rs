//! # Location Store
//!
//! Latest reported sample per agent. The store is a mapping, not a log:
//! each report replaces the previous record for that agent wholesale.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::GeoPoint;

/// Id assigned to reports that do not name their agent
pub const UNNAMED_AGENT_ID: &str = "unnamed";

/// Latest known position of one agent.
///
/// Numeric fields are stored exactly as received; a malformed field is
/// NaN and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters per second
    pub speed: f64,
    /// Ingestion time, drives staleness eviction
    pub last_updated: DateTime<Utc>,
    /// Event time as reported by the client, when it could be parsed
    pub reported_at: Option<DateTime<Utc>>,
}

impl LocationSample {
    /// Sample ingested now with no client timestamp
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, speed: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            speed,
            last_updated: Utc::now(),
            reported_at: None,
        }
    }

    pub fn with_last_updated(mut self, last_updated: DateTime<Utc>) -> Self {
        self.last_updated = last_updated;
        self
    }

    pub fn with_reported_at(mut self, reported_at: Option<DateTime<Utc>>) -> Self {
        self.reported_at = reported_at;
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Whether this sample is strictly older than `max_age` at `now`
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.last_updated > max_age
    }
}

/// In-memory agent id → latest sample mapping.
///
/// Every operation takes the lock once, so request handlers and the
/// staleness sweep never observe a half-applied mutation.
#[derive(Debug, Default)]
pub struct LocationStore {
    samples: RwLock<HashMap<String, LocationSample>>,
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or wholesale-replace the record for `sample.id`
    pub fn upsert(&self, sample: LocationSample) {
        let mut samples = self.samples.write();
        let replaced = samples.insert(sample.id.clone(), sample).is_some();
        debug!(count = samples.len(), replaced, "Location upserted");
    }

    /// Remove the record for `id`; returns whether it existed
    pub fn delete(&self, id: &str) -> bool {
        self.samples.write().remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<LocationSample> {
        self.samples.read().get(id).cloned()
    }

    /// Point-in-time copy of every record
    pub fn list_all(&self) -> HashMap<String, LocationSample> {
        self.samples.read().clone()
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }

    /// Remove every record last updated more than `max_age` before `now`.
    ///
    /// Returns the evicted ids. A record exactly `max_age` old survives.
    pub fn evict_stale(&self, now: DateTime<Utc>, max_age: Duration) -> Vec<String> {
        let mut samples = self.samples.write();
        let stale: Vec<String> = samples
            .values()
            .filter(|s| s.is_stale(now, max_age))
            .map(|s| s.id.clone())
            .collect();

        for id in &stale {
            samples.remove(id);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(id: &str, last_updated: DateTime<Utc>) -> LocationSample {
        LocationSample::new(id, 0.0, 0.0, 1.0).with_last_updated(last_updated)
    }

    #[test]
    fn test_upsert_replaces_wholesale() {
        let store = LocationStore::new();
        store.upsert(LocationSample::new("alice", 1.0, 2.0, 3.0).with_reported_at(Some(Utc::now())));
        store.upsert(LocationSample::new("alice", 4.0, 5.0, 6.0));

        assert_eq!(store.len(), 1);
        let alice = store.get("alice").unwrap();
        assert_eq!((alice.latitude, alice.longitude, alice.speed), (4.0, 5.0, 6.0));
        assert!(alice.reported_at.is_none());
    }

    #[test]
    fn test_delete() {
        let store = LocationStore::new();
        store.upsert(LocationSample::new("x", 0.0, 0.0, 0.0));

        assert!(store.delete("x"));
        assert!(!store.delete("x"));
        assert!(store.get("x").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_values_are_stored() {
        let store = LocationStore::new();
        store.upsert(LocationSample::new(UNNAMED_AGENT_ID, f64::NAN, 0.0, f64::NAN));

        let sample = store.get(UNNAMED_AGENT_ID).unwrap();
        assert!(sample.latitude.is_nan());
        assert!(sample.speed.is_nan());
    }

    #[test]
    fn test_evict_stale_boundary() {
        let store = LocationStore::new();
        let now = Utc::now();
        let max_age = Duration::milliseconds(60_000);

        store.upsert(sample_at("fresh", now - Duration::milliseconds(59_999)));
        store.upsert(sample_at("edge", now - Duration::milliseconds(60_000)));
        store.upsert(sample_at("stale", now - Duration::milliseconds(60_001)));

        let evicted = store.evict_stale(now, max_age);

        assert_eq!(evicted, vec!["stale".to_string()]);
        let remaining = store.list_all();
        assert!(remaining.contains_key("fresh"));
        assert!(remaining.contains_key("edge"));
        assert!(!remaining.contains_key("stale"));
    }

    #[test]
    fn test_list_all_is_a_snapshot() {
        let store = LocationStore::new();
        store.upsert(LocationSample::new("a", 0.0, 0.0, 0.0));

        let first = store.list_all();
        let second = store.list_all();
        assert_eq!(first, second);

        store.upsert(LocationSample::new("b", 0.0, 0.0, 0.0));
        assert_eq!(first.len(), 1);
        assert_eq!(store.len(), 2);
    }
}

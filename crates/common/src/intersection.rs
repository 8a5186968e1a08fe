//! # Intersection Registry
//!
//! Fixed points subject to crossing signals, kept in creation order. The
//! order matters: the signal engine picks the first nearby entry.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::GeoPoint;

/// A controlled point. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    pub id: u64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Intersection {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Insertion-ordered collection of intersections.
#[derive(Debug)]
pub struct IntersectionRegistry {
    entries: RwLock<Vec<Intersection>>,
    next_id: AtomicU64,
}

impl Default for IntersectionRegistry {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl IntersectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new intersection.
    ///
    /// Both coordinates must be present and finite. Ids come from a
    /// monotonic counter and are never reused, even after deletion.
    pub fn create(&self, latitude: Option<f64>, longitude: Option<f64>) -> Result<Intersection> {
        let (latitude, longitude) = match (latitude, longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
            _ => {
                return Err(Error::InvalidArgument(
                    "latitude and longitude must both be numbers".to_string(),
                ))
            }
        };

        // Allocate under the write lock so id order matches insertion order
        let mut entries = self.entries.write();
        let intersection = Intersection {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            latitude,
            longitude,
            created_at: Utc::now(),
        };
        entries.push(intersection.clone());
        debug!(id = intersection.id, count = entries.len(), "Intersection created");

        Ok(intersection)
    }

    /// Remove the entry with `id`; returns whether one was found
    pub fn delete(&self, id: u64) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|i| i.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Every entry, in creation order
    pub fn list_all(&self) -> Vec<Intersection> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

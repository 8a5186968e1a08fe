//! # Geodesy
//!
//! Spherical-earth helpers used by the signal engine.
//!
//! ## Table of Contents
//! 1. Constants
//! 2. GeoPoint
//! 3. Distance and bearing

use serde::{Deserialize, Serialize};

// ============================================================================
// 1. Constants
// ============================================================================

/// Earth radius in meters (spherical model)
pub const EARTH_MEAN_RADIUS: f64 = 6_371_000.0;

/// An agent is "at" an intersection when it is within this many meters of it
pub const PROXIMITY_RADIUS_METERS: f64 = 50.0;

// ============================================================================
// 2. GeoPoint
// ============================================================================

/// A WGS84 coordinate in degrees. No range validation is performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance to `other` in meters
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Initial bearing toward `other` in degrees, `[0, 360)`
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing_degrees(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Whether `other` lies within the proximity radius
    pub fn is_near(&self, other: &GeoPoint) -> bool {
        is_near(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

// ============================================================================
// 3. Distance and bearing
// ============================================================================

/// Great-circle distance in meters using the haversine formula.
///
/// NaN in any input yields NaN.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_MEAN_RADIUS * c
}

/// Initial compass bearing from point 1 toward point 2.
///
/// Returns degrees in `[0, 360)`, 0 = north, 90 = east.
pub fn bearing_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let y = delta_lon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    // Add before taking the remainder: rem_euclid can return exactly 360.0
    // for tiny negative angles.
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Whether two coordinates are within the proximity radius of each other
pub fn is_near(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> bool {
    distance_meters(lat1, lon1, lat2, lon2) <= PROXIMITY_RADIUS_METERS
}

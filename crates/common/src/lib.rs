//! # Crosslight Common
//!
//! Shared core for the Crosslight signal service: live agent positions,
//! fixed intersections, and the crossing-signal engine that turns the two
//! into a per-agent green/red/none decision.
//!
//! ## Table of Contents
//! 1. `geo` — great-circle distance, initial bearing, proximity radius
//! 2. `location` — latest-sample-per-agent store with staleness eviction
//! 3. `intersection` — insertion-ordered registry of fixed points
//! 4. `signal` — snapshot-based crossing detection
//! 5. `sweep` — periodic staleness sweep task
//! 6. `error` — core error taxonomy

pub mod error;
pub mod geo;
pub mod intersection;
pub mod location;
pub mod signal;
pub mod sweep;

pub use error::{Error, Result};
pub use geo::{
    bearing_degrees, distance_meters, is_near, GeoPoint, EARTH_MEAN_RADIUS,
    PROXIMITY_RADIUS_METERS,
};
pub use intersection::{Intersection, IntersectionRegistry};
pub use location::{LocationSample, LocationStore, UNNAMED_AGENT_ID};
pub use signal::{
    color_for, color_for_all, decide, trajectories_cross, SignalColor, SignalDecision,
    SignalResponse, Snapshot,
};
pub use sweep::{run_sweep_once, spawn_staleness_sweep, SweepConfig};

//! # Signal Engine
//!
//! Derives a per-agent traffic-signal color from one snapshot of the
//! location store and the intersection registry.
//!
//! ## Decision
//! ```text
//! agent ──► first nearby intersection (registry order) ──► none if absent
//!                       │
//!                       ▼
//!        other agents within radius of it ──► green if absent
//!                       │
//!                       ▼
//!   any bearing pair crossing? ──► red, otherwise green
//! ```
//!
//! The first nearby intersection is chosen by registry order, not by
//! distance. Agents beyond the first intersection are never considered.
//!
//! ## Table of Contents
//! 1. SignalColor / SignalResponse
//! 2. Snapshot
//! 3. Crossing predicate
//! 4. Per-agent and batch decisions

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::intersection::{Intersection, IntersectionRegistry};
use crate::location::{LocationSample, LocationStore};

// ============================================================================
// 1. SignalColor / SignalResponse
// ============================================================================

/// Signal shown to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalColor {
    /// Proceed: at an intersection with no conflicting approach
    Green,
    /// Yield: another agent approaches the same intersection on a crossing path
    Red,
    /// Not at any intersection
    None,
}

/// Wire shape of a signal result: `{ "color": "green" }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalResponse {
    pub color: SignalColor,
}

impl From<SignalColor> for SignalResponse {
    fn from(color: SignalColor) -> Self {
        Self { color }
    }
}

/// A color together with what it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalDecision {
    pub color: SignalColor,
    /// Selected intersection, if the agent was near one
    pub intersection_id: Option<u64>,
    /// Other agents within radius of the selected intersection
    pub co_present: Vec<String>,
    /// First co-present agent whose path crosses this one
    pub conflicting_agent: Option<String>,
}

// ============================================================================
// 2. Snapshot
// ============================================================================

/// Point-in-time copy of both stores. The engine only ever reads this.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub locations: HashMap<String, LocationSample>,
    pub intersections: Vec<Intersection>,
}

impl Snapshot {
    pub fn new(locations: HashMap<String, LocationSample>, intersections: Vec<Intersection>) -> Self {
        Self { locations, intersections }
    }

    /// Copy both stores. Each copy is taken under its own lock.
    pub fn capture(locations: &LocationStore, intersections: &IntersectionRegistry) -> Self {
        Self {
            locations: locations.list_all(),
            intersections: intersections.list_all(),
        }
    }

    /// First intersection in registry order within radius of `point`
    fn first_nearby(&self, point: &GeoPoint) -> Option<&Intersection> {
        self.intersections
            .iter()
            .find(|i| point.is_near(&i.position()))
    }

    /// Agents other than `agent_id` within radius of `intersection`
    fn co_present<'a>(
        &'a self,
        agent_id: &'a str,
        intersection: &'a GeoPoint,
    ) -> impl Iterator<Item = &'a LocationSample> + 'a {
        self.locations.values().filter(move |other| {
            other.id != agent_id && other.position().is_near(intersection)
        })
    }
}

// ============================================================================
// 3. Crossing predicate
// ============================================================================

/// Whether two bearings toward the same point describe crossing paths.
///
/// Roughly perpendicular approaches, in either rotational sense, cross.
/// Near-parallel (difference near 0 or 360) and near-opposite (near 180)
/// approaches do not.
pub fn trajectories_cross(bearing_a: f64, bearing_b: f64) -> bool {
    let d = (bearing_a - bearing_b).abs();
    (d > 45.0 && d < 135.0) || (d > 225.0 && d < 315.0)
}

// ============================================================================
// 4. Per-agent and batch decisions
// ============================================================================

/// Full decision for one agent.
///
/// Fails with [`Error::NotFound`] when the agent has no sample.
pub fn decide(snapshot: &Snapshot, agent_id: &str) -> Result<SignalDecision> {
    let agent = snapshot
        .locations
        .get(agent_id)
        .ok_or_else(|| Error::NotFound(format!("no location for agent '{agent_id}'")))?;
    let position = agent.position();

    let Some(intersection) = snapshot.first_nearby(&position) else {
        return Ok(SignalDecision {
            color: SignalColor::None,
            intersection_id: None,
            co_present: Vec::new(),
            conflicting_agent: None,
        });
    };
    let target = intersection.position();

    let mut co_present: Vec<&LocationSample> = snapshot.co_present(agent_id, &target).collect();
    co_present.sort_by(|a, b| a.id.cmp(&b.id));

    let own_bearing = position.bearing_to(&target);
    let conflicting_agent = co_present
        .iter()
        .find(|other| trajectories_cross(own_bearing, other.position().bearing_to(&target)))
        .map(|other| other.id.clone());

    let color = if conflicting_agent.is_some() {
        SignalColor::Red
    } else {
        SignalColor::Green
    };

    Ok(SignalDecision {
        color,
        intersection_id: Some(intersection.id),
        co_present: co_present.into_iter().map(|s| s.id.clone()).collect(),
        conflicting_agent,
    })
}

/// Signal color for one agent
pub fn color_for(snapshot: &Snapshot, agent_id: &str) -> Result<SignalColor> {
    decide(snapshot, agent_id).map(|d| d.color)
}

/// Signal color for every agent in the snapshot.
///
/// Identical to calling [`color_for`] once per agent on the same snapshot.
pub fn color_for_all(snapshot: &Snapshot) -> BTreeMap<String, SignalColor> {
    snapshot
        .locations
        .keys()
        .filter_map(|id| color_for(snapshot, id).ok().map(|color| (id.clone(), color)))
        .collect()
}

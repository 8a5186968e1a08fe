//! End-to-end scenarios over the real stores: report, register, query,
//! delete and sweep, as the transport layer drives them.

use std::sync::Arc;

use chrono::{Duration, Utc};
use crosslight_common::{
    color_for, color_for_all, run_sweep_once, Error, IntersectionRegistry, LocationSample,
    LocationStore, SignalColor, Snapshot, SweepConfig,
};

fn report(store: &LocationStore, id: &str, latitude: f64, longitude: f64) {
    store.upsert(LocationSample::new(id, latitude, longitude, 8.0));
}

#[test]
fn test_opposite_sides_of_one_intersection_get_green() {
    let locations = LocationStore::new();
    let intersections = IntersectionRegistry::new();
    intersections.create(Some(0.0), Some(0.0001)).unwrap();

    report(&locations, "Alice", 0.0, 0.0);
    report(&locations, "Bob", 0.0, 0.0002);

    let snapshot = Snapshot::capture(&locations, &intersections);
    assert_eq!(color_for(&snapshot, "Alice").unwrap(), SignalColor::Green);
    assert_eq!(color_for(&snapshot, "Bob").unwrap(), SignalColor::Green);
}

#[test]
fn test_perpendicular_approaches_get_red() {
    let locations = LocationStore::new();
    let intersections = IntersectionRegistry::new();
    intersections.create(Some(10.0), Some(20.0)).unwrap();

    report(&locations, "from_south", 9.9998, 20.0);
    report(&locations, "from_west", 10.0, 19.9998);

    let colors = color_for_all(&Snapshot::capture(&locations, &intersections));
    assert_eq!(colors["from_south"], SignalColor::Red);
    assert_eq!(colors["from_west"], SignalColor::Red);
}

#[test]
fn test_deleted_agent_is_not_found() {
    let locations = LocationStore::new();
    let intersections = IntersectionRegistry::new();

    report(&locations, "X", 1.0, 1.0);
    assert!(locations.delete("X"));

    let snapshot = Snapshot::capture(&locations, &intersections);
    assert!(matches!(color_for(&snapshot, "X"), Err(Error::NotFound(_))));
    assert!(!color_for_all(&snapshot).contains_key("X"));
}

#[test]
fn test_agents_far_from_every_intersection_get_none() {
    let locations = LocationStore::new();
    let intersections = IntersectionRegistry::new();
    intersections.create(Some(0.0), Some(0.0)).unwrap();
    intersections.create(Some(1.0), Some(1.0)).unwrap();

    report(&locations, "a", 0.0005, 0.0);
    report(&locations, "b", 0.5, 0.5);

    let colors = color_for_all(&Snapshot::capture(&locations, &intersections));
    assert!(colors.values().all(|c| *c == SignalColor::None));
}

#[test]
fn test_removing_intersection_clears_signal() {
    let locations = LocationStore::new();
    let intersections = IntersectionRegistry::new();
    let created = intersections.create(Some(0.0), Some(0.0)).unwrap();
    report(&locations, "a", 0.0001, 0.0);

    let before = Snapshot::capture(&locations, &intersections);
    assert_eq!(color_for(&before, "a").unwrap(), SignalColor::Green);

    assert!(intersections.delete(created.id));
    let after = Snapshot::capture(&locations, &intersections);
    assert_eq!(color_for(&after, "a").unwrap(), SignalColor::None);
}

#[test]
fn test_sweep_threshold() {
    let locations = Arc::new(LocationStore::new());
    let now = Utc::now();
    locations.upsert(
        LocationSample::new("stale", 0.0, 0.0, 0.0).with_last_updated(now - Duration::milliseconds(60_001)),
    );
    locations.upsert(
        LocationSample::new("alive", 0.0, 0.0, 0.0).with_last_updated(now - Duration::milliseconds(59_999)),
    );

    run_sweep_once(&locations, &SweepConfig::default(), now);

    let listed = locations.list_all();
    assert!(!listed.contains_key("stale"));
    assert!(listed.contains_key("alive"));
}

#[test]
fn test_repeated_queries_are_idempotent() {
    let locations = LocationStore::new();
    let intersections = IntersectionRegistry::new();
    intersections.create(Some(0.0), Some(0.0)).unwrap();
    report(&locations, "a", -0.0002, 0.0);
    report(&locations, "b", 0.0, -0.0002);
    report(&locations, "c", 0.0, 0.0002);

    assert_eq!(locations.list_all(), locations.list_all());

    let first = color_for_all(&Snapshot::capture(&locations, &intersections));
    let second = color_for_all(&Snapshot::capture(&locations, &intersections));
    assert_eq!(first, second);
}

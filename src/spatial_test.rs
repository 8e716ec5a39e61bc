use super::*;
use uuid::Uuid;

fn id() -> ElementId {
    Uuid::new_v4()
}

fn world() -> Rect {
    Rect::new(0.0, 0.0, 1000.0, 1000.0)
}

// --- Insert / query ---

#[test]
fn query_finds_intersecting_entry() {
    let mut index = SpatialIndex::new(world());
    let a = id();
    index.insert(a, Rect::new(10.0, 10.0, 20.0, 20.0));
    let hits = index.query(&Rect::new(0.0, 0.0, 15.0, 15.0));
    assert_eq!(hits, vec![a]);
}

#[test]
fn query_misses_disjoint_entry() {
    let mut index = SpatialIndex::new(world());
    index.insert(id(), Rect::new(500.0, 500.0, 20.0, 20.0));
    assert!(index.query(&Rect::new(0.0, 0.0, 100.0, 100.0)).is_empty());
}

#[test]
fn query_returns_overlapping_entries() {
    let mut index = SpatialIndex::new(world());
    let a = id();
    let b = id();
    let c = id();
    index.insert(a, Rect::new(10.0, 10.0, 10.0, 10.0));
    index.insert(b, Rect::new(30.0, 30.0, 10.0, 10.0));
    index.insert(c, Rect::new(800.0, 800.0, 10.0, 10.0));
    let mut hits = index.query(&Rect::new(0.0, 0.0, 45.0, 45.0));
    hits.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(hits, expected);
}

#[test]
fn entry_outside_world_region_is_still_found() {
    let mut index = SpatialIndex::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let a = id();
    index.insert(a, Rect::new(5000.0, 5000.0, 10.0, 10.0));
    assert_eq!(index.query(&Rect::new(4990.0, 4990.0, 100.0, 100.0)), vec![a]);
}

#[test]
fn subdivision_preserves_all_entries() {
    let mut index = SpatialIndex::new(world());
    let mut ids = Vec::new();
    // Enough clustered entries to force several subdivisions.
    for i in 0..100 {
        let e = id();
        let x = f64::from(i % 10) * 12.0;
        let y = f64::from(i / 10) * 12.0;
        index.insert(e, Rect::new(x, y, 10.0, 10.0));
        ids.push(e);
    }
    let hits = index.query(&Rect::new(-10.0, -10.0, 2000.0, 2000.0));
    assert_eq!(hits.len(), ids.len());
}

#[test]
fn straddling_entry_is_discoverable_from_both_sides() {
    let mut index = SpatialIndex::new(world());
    // Force subdivision first.
    for i in 0..9 {
        index.insert(id(), Rect::new(f64::from(i) * 2.0, 0.0, 1.0, 1.0));
    }
    let straddler = id();
    index.insert(straddler, Rect::new(480.0, 480.0, 40.0, 40.0));
    assert!(index.query(&Rect::new(470.0, 470.0, 15.0, 15.0)).contains(&straddler));
    assert!(index.query(&Rect::new(515.0, 515.0, 5.0, 5.0)).contains(&straddler));
}

// --- Remove ---

#[test]
fn remove_makes_entry_unqueryable() {
    let mut index = SpatialIndex::new(world());
    let a = id();
    let bounds = Rect::new(10.0, 10.0, 20.0, 20.0);
    index.insert(a, bounds);
    assert!(index.remove(a, bounds));
    assert!(index.query(&Rect::new(0.0, 0.0, 100.0, 100.0)).is_empty());
    assert!(index.is_empty());
}

#[test]
fn remove_missing_returns_false() {
    let mut index = SpatialIndex::new(world());
    assert!(!index.remove(id(), Rect::new(0.0, 0.0, 10.0, 10.0)));
}

#[test]
fn remove_after_subdivision() {
    let mut index = SpatialIndex::new(world());
    let mut entries = Vec::new();
    for i in 0..50 {
        let e = id();
        let bounds = Rect::new(f64::from(i) * 15.0, f64::from(i) * 15.0, 10.0, 10.0);
        index.insert(e, bounds);
        entries.push((e, bounds));
    }
    let (victim, victim_bounds) = entries[25];
    assert!(index.remove(victim, victim_bounds));
    assert_eq!(index.len(), 49);
    assert!(!index.query(&victim_bounds.expand(1.0)).contains(&victim));
}

// --- Build ---

#[test]
fn build_from_items() {
    let a = id();
    let b = id();
    let index = SpatialIndex::build(&[
        (a, Rect::new(0.0, 0.0, 10.0, 10.0)),
        (b, Rect::new(-500.0, 200.0, 10.0, 10.0)),
    ]);
    assert_eq!(index.len(), 2);
    assert_eq!(index.query(&Rect::new(-505.0, 195.0, 20.0, 20.0)), vec![b]);
}

#[test]
fn build_empty() {
    let index = SpatialIndex::build(&[]);
    assert!(index.is_empty());
    assert!(index.query(&Rect::new(0.0, 0.0, 10.0, 10.0)).is_empty());
}

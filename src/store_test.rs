#![allow(clippy::float_cmp)]

use super::*;
use crate::element::{PortKind, PortRef, RouteMode};

fn rect_at(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(x, y, ElementKind::Rectangle { width: w, height: h })
}

fn stroke_at(x: f64, y: f64, points: Vec<Point>) -> Element {
    Element::new(x, y, ElementKind::Stroke { points, stroke_width: 2.0 })
}

// =============================================================
// Add / get / remove
// =============================================================

#[test]
fn add_then_get() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, 100.0, 50.0));
    let el = store.get(id).expect("present");
    assert_eq!(el.x, 0.0);
    assert_eq!(store.len(), 1);
}

#[test]
fn add_clamps_invalid_sizes() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, -5.0, f64::NAN));
    let el = store.get(id).expect("present");
    assert_eq!(el.kind, ElementKind::Rectangle { width: 1.0, height: 1.0 });
}

#[test]
fn add_stamps_timestamps() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    let b = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    let ta = store.get(a).expect("present").created_at;
    let tb = store.get(b).expect("present").created_at;
    assert!(tb > ta);
}

#[test]
fn remove_returns_element() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(1.0, 2.0, 10.0, 10.0));
    let el = store.remove(id).expect("removed");
    assert_eq!(el.x, 1.0);
    assert!(store.is_empty());
    assert!(store.remove(id).is_none());
}

// =============================================================
// Update
// =============================================================

#[test]
fn update_moves_element() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    assert!(store.update(id, &ElementPatch::at(40.0, 50.0)));
    let el = store.get(id).expect("present");
    assert_eq!((el.x, el.y), (40.0, 50.0));
}

#[test]
fn update_missing_returns_false() {
    let mut store = ElementStore::new();
    assert!(!store.update(uuid::Uuid::new_v4(), &ElementPatch::at(0.0, 0.0)));
}

#[test]
fn update_clamps_sizes() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    assert!(store.update(id, &ElementPatch::sized(-40.0, 0.0)));
    let el = store.get(id).expect("present");
    assert_eq!(el.kind, ElementKind::Rectangle { width: 1.0, height: 1.0 });
}

#[test]
fn update_ignores_non_finite_position() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(5.0, 6.0, 10.0, 10.0));
    assert!(store.update(id, &ElementPatch::at(f64::NAN, f64::INFINITY)));
    let el = store.get(id).expect("present");
    assert_eq!((el.x, el.y), (5.0, 6.0));
}

#[test]
fn update_ignores_fields_for_other_kinds() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    let patch = ElementPatch { radius_x: Some(99.0), ..ElementPatch::default() };
    assert!(store.update(id, &patch));
    let el = store.get(id).expect("present");
    assert_eq!(el.kind, ElementKind::Rectangle { width: 10.0, height: 10.0 });
}

#[test]
fn update_bumps_updated_at_only() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    let created = store.get(id).expect("present").created_at;
    store.update(id, &ElementPatch::at(1.0, 1.0));
    let el = store.get(id).expect("present");
    assert_eq!(el.created_at, created);
    assert!(el.updated_at > created);
}

#[test]
fn update_sets_and_clears_parent() {
    let mut store = ElementStore::new();
    let section = store.add(Element::new(100.0, 100.0, ElementKind::Section { width: 200.0, height: 200.0 }));
    let id = store.add(rect_at(10.0, 10.0, 10.0, 10.0));
    let attach = ElementPatch { parent: Some(Some(section)), ..ElementPatch::default() };
    store.update(id, &attach);
    assert_eq!(store.get(id).expect("present").parent, Some(section));
    let detach = ElementPatch { parent: Some(None), ..ElementPatch::default() };
    store.update(id, &detach);
    assert_eq!(store.get(id).expect("present").parent, None);
}

// =============================================================
// World bounds / parent chain
// =============================================================

#[test]
fn world_bounds_without_parent_match_local() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(10.0, 20.0, 30.0, 40.0));
    assert_eq!(store.world_bounds(id), Some(Rect::new(10.0, 20.0, 30.0, 40.0)));
}

#[test]
fn world_bounds_resolve_section_offset() {
    let mut store = ElementStore::new();
    let section = store.add(Element::new(100.0, 200.0, ElementKind::Section { width: 500.0, height: 500.0 }));
    let mut child = rect_at(10.0, 20.0, 30.0, 40.0);
    child.parent = Some(section);
    let id = store.add(child);
    assert_eq!(store.world_bounds(id), Some(Rect::new(110.0, 220.0, 30.0, 40.0)));
}

#[test]
fn world_bounds_resolve_nested_sections() {
    let mut store = ElementStore::new();
    let outer = store.add(Element::new(1000.0, 0.0, ElementKind::Section { width: 900.0, height: 900.0 }));
    let mut inner_el = Element::new(100.0, 100.0, ElementKind::Section { width: 400.0, height: 400.0 });
    inner_el.parent = Some(outer);
    let inner = store.add(inner_el);
    let mut child = rect_at(10.0, 10.0, 10.0, 10.0);
    child.parent = Some(inner);
    let id = store.add(child);
    assert_eq!(store.world_bounds(id), Some(Rect::new(1110.0, 110.0, 10.0, 10.0)));
}

#[test]
fn parent_cycle_terminates() {
    let mut store = ElementStore::new();
    let a = store.add(Element::new(1.0, 1.0, ElementKind::Section { width: 10.0, height: 10.0 }));
    let b = store.add(Element::new(2.0, 2.0, ElementKind::Section { width: 10.0, height: 10.0 }));
    store.update(a, &ElementPatch { parent: Some(Some(b)), ..ElementPatch::default() });
    store.update(b, &ElementPatch { parent: Some(Some(a)), ..ElementPatch::default() });
    // Must not hang; the offset is cut off at the depth cap.
    assert!(store.world_bounds(a).is_some());
}

// =============================================================
// Dirty bookkeeping
// =============================================================

#[test]
fn mutations_mark_spatial_dirty() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    store.clear_spatial_dirty();
    store.update(id, &ElementPatch::at(5.0, 5.0));
    assert!(store.is_spatial_dirty());
    store.clear_spatial_dirty();
    store.remove(id);
    assert!(store.is_spatial_dirty());
}

#[test]
fn element_mutation_dirties_attached_edges() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 100.0, 100.0));
    let b = store.add(rect_at(300.0, 0.0, 100.0, 100.0));
    let edge_id = store.add_edge(Edge::new(
        EdgeEndpoint::Port(PortRef { element: a, port: PortKind::E }),
        EdgeEndpoint::Port(PortRef { element: b, port: PortKind::W }),
        RouteMode::Straight,
    ));
    store.take_dirty_edges();
    store.update(a, &ElementPatch::at(10.0, 10.0));
    let dirty = store.take_dirty_edges();
    assert_eq!(dirty, vec![edge_id]);
}

#[test]
fn unrelated_edges_stay_clean() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 100.0, 100.0));
    let b = store.add(rect_at(300.0, 0.0, 100.0, 100.0));
    store.add_edge(Edge::new(
        EdgeEndpoint::Free(Point::new(0.0, 0.0)),
        EdgeEndpoint::Free(Point::new(10.0, 10.0)),
        RouteMode::Straight,
    ));
    store.take_dirty_edges();
    store.update(a, &ElementPatch::at(10.0, 10.0));
    store.update(b, &ElementPatch::at(20.0, 20.0));
    assert!(!store.has_dirty_edges());
}

#[test]
fn take_dirty_edges_drains() {
    let mut store = ElementStore::new();
    store.add_edge(Edge::new(
        EdgeEndpoint::Free(Point::new(0.0, 0.0)),
        EdgeEndpoint::Free(Point::new(1.0, 1.0)),
        RouteMode::Straight,
    ));
    assert!(store.has_dirty_edges());
    assert_eq!(store.take_dirty_edges().len(), 1);
    assert!(!store.has_dirty_edges());
}

// =============================================================
// Removal detaches connectors
// =============================================================

#[test]
fn remove_detaches_edge_to_cached_endpoint() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 100.0, 100.0));
    let edge_id = store.add_edge(Edge::new(
        EdgeEndpoint::Port(PortRef { element: a, port: PortKind::E }),
        EdgeEndpoint::Free(Point::new(250.0, 300.0)),
        RouteMode::Straight,
    ));
    store.set_edge_points(edge_id, vec![Point::new(100.0, 50.0), Point::new(250.0, 300.0)]);
    store.remove(a);
    let edge = store.edge(edge_id).expect("edge survives");
    assert_eq!(edge.source, EdgeEndpoint::Free(Point::new(100.0, 50.0)));
    assert_eq!(edge.target, EdgeEndpoint::Free(Point::new(250.0, 300.0)));
}

#[test]
fn remove_detaches_unrouted_edge_to_center() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 100.0, 100.0));
    let edge_id = store.add_edge(Edge::new(
        EdgeEndpoint::Port(PortRef { element: a, port: PortKind::E }),
        EdgeEndpoint::Free(Point::new(250.0, 300.0)),
        RouteMode::Straight,
    ));
    store.remove(a);
    let edge = store.edge(edge_id).expect("edge survives");
    assert_eq!(edge.source, EdgeEndpoint::Free(Point::new(50.0, 50.0)));
}

#[test]
fn remove_marks_detached_edge_dirty() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 100.0, 100.0));
    let edge_id = store.add_edge(Edge::new(
        EdgeEndpoint::Port(PortRef { element: a, port: PortKind::E }),
        EdgeEndpoint::Free(Point::new(250.0, 300.0)),
        RouteMode::Straight,
    ));
    store.take_dirty_edges();
    store.remove(a);
    assert_eq!(store.take_dirty_edges(), vec![edge_id]);
}

// =============================================================
// Edge CRUD
// =============================================================

#[test]
fn edge_crud_round_trip() {
    let mut store = ElementStore::new();
    let id = store.add_edge(Edge::new(
        EdgeEndpoint::Free(Point::new(0.0, 0.0)),
        EdgeEndpoint::Free(Point::new(5.0, 5.0)),
        RouteMode::Curved,
    ));
    assert_eq!(store.edge_count(), 1);
    assert!(store.edge(id).is_some());
    assert!(store.remove_edge(id).is_some());
    assert_eq!(store.edge_count(), 0);
}

#[test]
fn set_edge_endpoint_marks_dirty() {
    let mut store = ElementStore::new();
    let id = store.add_edge(Edge::new(
        EdgeEndpoint::Free(Point::new(0.0, 0.0)),
        EdgeEndpoint::Free(Point::new(5.0, 5.0)),
        RouteMode::Straight,
    ));
    store.take_dirty_edges();
    assert!(store.set_edge_endpoint(id, true, EdgeEndpoint::Free(Point::new(9.0, 9.0))));
    assert_eq!(store.take_dirty_edges(), vec![id]);
}

#[test]
fn edges_of_finds_attachments() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    let attached = store.add_edge(Edge::new(
        EdgeEndpoint::Port(PortRef { element: a, port: PortKind::N }),
        EdgeEndpoint::Free(Point::new(5.0, 5.0)),
        RouteMode::Straight,
    ));
    store.add_edge(Edge::new(
        EdgeEndpoint::Free(Point::new(0.0, 0.0)),
        EdgeEndpoint::Free(Point::new(5.0, 5.0)),
        RouteMode::Straight,
    ));
    assert_eq!(store.edges_of(a), vec![attached]);
}

// =============================================================
// Draw order
// =============================================================

#[test]
fn sorted_elements_by_z_then_id() {
    let mut store = ElementStore::new();
    let mut hi = rect_at(0.0, 0.0, 10.0, 10.0);
    hi.z_index = 5;
    let mut lo = rect_at(0.0, 0.0, 10.0, 10.0);
    lo.z_index = -1;
    let hi_id = store.add(hi);
    let lo_id = store.add(lo);
    let order: Vec<ElementId> = store.sorted_elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![lo_id, hi_id]);
}

// =============================================================
// History replay paths
// =============================================================

#[test]
fn restore_element_is_verbatim() {
    let mut store = ElementStore::new();
    let id = store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    let recorded = store.get(id).expect("present").clone();
    store.purge_element(id);
    store.restore_element(recorded.clone());
    assert_eq!(store.get(id), Some(&recorded));
}

#[test]
fn purge_element_skips_detach_policy() {
    let mut store = ElementStore::new();
    let a = store.add(rect_at(0.0, 0.0, 100.0, 100.0));
    let edge_id = store.add_edge(Edge::new(
        EdgeEndpoint::Port(PortRef { element: a, port: PortKind::E }),
        EdgeEndpoint::Free(Point::new(250.0, 300.0)),
        RouteMode::Straight,
    ));
    store.purge_element(a);
    let edge = store.edge(edge_id).expect("edge survives");
    // Endpoint still references the purged element; history replay will
    // restore it or rewrite the edge in the same entry.
    assert!(edge.references(a));
}

// =============================================================
// Hydration
// =============================================================

#[test]
fn load_replaces_contents_and_marks_dirty() {
    let mut store = ElementStore::new();
    store.add(rect_at(0.0, 0.0, 10.0, 10.0));
    let replacement = rect_at(5.0, 5.0, 20.0, 20.0);
    let replacement_id = replacement.id;
    store.load(vec![replacement], vec![]);
    assert_eq!(store.len(), 1);
    assert!(store.get(replacement_id).is_some());
    assert!(store.is_spatial_dirty());
    assert!(!store.has_dirty_edges());
}

#![allow(clippy::float_cmp)]

use super::*;
use crate::store::ElementStore;

fn rect_el(w: f64, h: f64) -> Element {
    Element::new(0.0, 0.0, ElementKind::Rectangle { width: w, height: h })
}

fn scale(sx: f64, sy: f64) -> AppliedTransform {
    AppliedTransform { scale_x: sx, scale_y: sy, rotation: 0.0 }
}

// =============================================================
// Scale folding per kind
// =============================================================

#[test]
fn rectangle_scales_width_and_height() {
    let patch = normalize(&rect_el(100.0, 50.0), scale(2.0, 0.5));
    assert_eq!(patch.width, Some(200.0));
    assert_eq!(patch.height, Some(25.0));
    assert_eq!(patch.radius_x, None);
}

#[test]
fn ellipse_scales_radii() {
    let el = Element::new(0.0, 0.0, ElementKind::Ellipse { radius_x: 50.0, radius_y: 30.0 });
    let patch = normalize(&el, scale(2.0, 3.0));
    assert_eq!(patch.radius_x, Some(100.0));
    assert_eq!(patch.radius_y, Some(90.0));
    assert_eq!(patch.width, None);
}

#[test]
fn stroke_scales_points_about_origin() {
    let el = Element::new(10.0, 10.0, ElementKind::Stroke {
        points: vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)],
        stroke_width: 2.0,
    });
    let patch = normalize(&el, scale(2.0, 0.5));
    assert_eq!(patch.points, Some(vec![Point::new(0.0, 0.0), Point::new(20.0, 10.0)]));
}

#[test]
fn identity_scale_leaves_stroke_points_alone() {
    let el = Element::new(0.0, 0.0, ElementKind::Stroke {
        points: vec![Point::new(5.0, 5.0)],
        stroke_width: 2.0,
    });
    let patch = normalize(&el, scale(1.0, 1.0));
    assert_eq!(patch.points, None);
}

// =============================================================
// Clamping and bad input
// =============================================================

#[test]
fn scaled_size_clamps_to_minimum() {
    let patch = normalize(&rect_el(100.0, 50.0), scale(0.001, 0.001));
    assert_eq!(patch.width, Some(crate::consts::MIN_SIZE));
    assert_eq!(patch.height, Some(crate::consts::MIN_SIZE));
}

#[test]
fn negative_scale_folds_as_magnitude() {
    let patch = normalize(&rect_el(100.0, 50.0), scale(-2.0, -1.0));
    assert_eq!(patch.width, Some(200.0));
    assert_eq!(patch.height, Some(50.0));
}

#[test]
fn non_finite_scale_folds_as_identity() {
    let patch = normalize(&rect_el(100.0, 50.0), scale(f64::NAN, f64::INFINITY));
    assert_eq!(patch.width, Some(100.0));
    assert_eq!(patch.height, Some(50.0));
}

#[test]
fn non_finite_rotation_keeps_current() {
    let mut el = rect_el(10.0, 10.0);
    el.rotation = 45.0;
    let patch = normalize(&el, AppliedTransform {
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: f64::NAN,
    });
    assert_eq!(patch.rotation, Some(45.0));
}

// =============================================================
// Rotation and idempotence
// =============================================================

#[test]
fn rotation_is_always_persisted() {
    let patch = normalize(&rect_el(10.0, 10.0), AppliedTransform {
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 90.0,
    });
    assert_eq!(patch.rotation, Some(90.0));
    assert_eq!(patch.width, Some(10.0));
}

#[test]
fn normalizing_twice_is_idempotent() {
    let mut store = ElementStore::new();
    let id = store.add(rect_el(100.0, 50.0));
    let transform = AppliedTransform { scale_x: 1.5, scale_y: 2.0, rotation: 30.0 };

    let patch = normalize(store.get(id).expect("present"), transform);
    store.update(id, &patch);
    let once = store.get(id).expect("present").clone();

    // The gesture ended, so the transient scale is back at identity.
    let patch = normalize(&once, AppliedTransform { rotation: 30.0, ..AppliedTransform::identity() });
    store.update(id, &patch);
    let twice = store.get(id).expect("present");

    assert_eq!(once.kind, twice.kind);
    assert_eq!(once.rotation, twice.rotation);
}

#[test]
fn identity_transform_is_a_geometry_no_op() {
    let el = rect_el(100.0, 50.0);
    let patch = normalize(&el, AppliedTransform::identity());
    assert_eq!(patch.width, Some(100.0));
    assert_eq!(patch.height, Some(50.0));
    assert!(AppliedTransform::identity().is_identity());
}

//! Radius erasure over stroke elements.
//!
//! The eraser is a moving circle. Each sample queries the spatial index with
//! the circle's bounding box, filters candidates through the erasable
//! predicate, and deletes a stroke when any of its points falls inside the
//! radius. Whole strokes go at once; there is no partial-stroke splitting.

#[cfg(test)]
#[path = "erase_test.rs"]
mod erase_test;

use crate::element::{Element, ElementId, ElementKind};
use crate::geom::{point_in_circle, Point, Rect};
use crate::spatial::SpatialIndex;
use crate::store::ElementStore;

/// Whether the eraser may delete this element at all.
///
/// Only strokes are erasable, and locked or hidden ones are off limits.
/// Kind exclusions live here rather than in the sweep loop.
#[must_use]
pub fn erasable(el: &Element) -> bool {
    matches!(el.kind, ElementKind::Stroke { .. }) && !el.locked && !el.hidden
}

/// Whether any point of the element lies inside the eraser circle.
///
/// Stroke points are stored relative to the element position, so each is
/// lifted to world space first. Stops at the first point inside the radius.
#[must_use]
pub fn element_hit(store: &ElementStore, el: &Element, center: Point, radius: f64) -> bool {
    let ElementKind::Stroke { ref points, .. } = el.kind else {
        return false;
    };
    let (dx, dy) = store.parent_offset(el);
    points
        .iter()
        .any(|p| point_in_circle(Point::new(p.x + el.x + dx, p.y + el.y + dy), center, radius))
}

/// Erasable elements hit by a single eraser sample, found through the
/// spatial index. The returned ids are deduplicated and unordered.
#[must_use]
pub fn hits_at(
    store: &ElementStore,
    index: &SpatialIndex,
    center: Point,
    radius: f64,
) -> Vec<ElementId> {
    let footprint = Rect::around_circle(center, radius);
    index
        .query(&footprint)
        .into_iter()
        .filter(|id| {
            store
                .get(*id)
                .is_some_and(|el| erasable(el) && element_hit(store, el, center, radius))
        })
        .collect()
}

/// Sweep the eraser along a recorded path, collecting every element hit by
/// any sample. Used for the gesture-end pass that catches late samples.
#[must_use]
pub fn hits_along(
    store: &ElementStore,
    index: &SpatialIndex,
    path: &[Point],
    radius: f64,
) -> Vec<ElementId> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for &sample in path {
        for id in hits_at(store, index, sample, radius) {
            if seen.insert(id) {
                out.push(id);
            }
        }
    }
    out
}

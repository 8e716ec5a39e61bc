//! Attachment-port resolution.
//!
//! Ports are computed on demand from current element geometry — never stored
//! or cached across mutations. Resolution is kind-specific: ellipses place
//! ports on the perimeter along the four cardinal directions scaled by
//! radius, rectangle-like container kinds at edge midpoints scaled by
//! half-width/half-height, and free-form kinds (text, tables, strokes)
//! expose no ports at all.

#[cfg(test)]
#[path = "port_test.rs"]
mod port_test;

use crate::element::{Element, ElementId, ElementKind, PortKind, PortRef};
use crate::geom::Point;
use crate::store::ElementStore;

/// The four perimeter ports exposed by ported kinds.
pub const PERIMETER_PORTS: [PortKind; 4] = [PortKind::N, PortKind::S, PortKind::E, PortKind::W];

/// Resolve a port in the element's own coordinate space. Returns `None`
/// for kinds that expose no ports.
#[must_use]
pub fn local_port(element: &Element, port: PortKind) -> Option<Point> {
    match &element.kind {
        ElementKind::Rectangle { width, height }
        | ElementKind::Sticky { width, height, .. }
        | ElementKind::Image { width, height, .. }
        | ElementKind::Section { width, height } => {
            let cx = element.x + width / 2.0;
            let cy = element.y + height / 2.0;
            Some(match port {
                PortKind::N => Point::new(cx, element.y),
                PortKind::S => Point::new(cx, element.y + height),
                PortKind::E => Point::new(element.x + width, cy),
                PortKind::W => Point::new(element.x, cy),
                PortKind::Center => Point::new(cx, cy),
            })
        }
        ElementKind::Ellipse { radius_x, radius_y } => {
            let (nx, ny) = port.outward_normal();
            Some(Point::new(
                element.x + nx * radius_x,
                element.y + ny * radius_y,
            ))
        }
        ElementKind::Text { .. } | ElementKind::Table { .. } | ElementKind::Stroke { .. } => None,
    }
}

/// All perimeter ports of an element in its own coordinate space.
#[must_use]
pub fn local_ports(element: &Element) -> Vec<(PortKind, Point)> {
    PERIMETER_PORTS
        .iter()
        .filter_map(|&kind| local_port(element, kind).map(|p| (kind, p)))
        .collect()
}

/// Resolve a port in world coordinates, accounting for section-relative
/// element positions. Returns `None` if the element is missing or the kind
/// exposes no ports.
#[must_use]
pub fn world_port(store: &ElementStore, id: ElementId, port: PortKind) -> Option<Point> {
    let element = store.get(id)?;
    let local = local_port(element, port)?;
    let (dx, dy) = store.parent_offset(element);
    Some(local.offset(dx, dy))
}

/// The closest perimeter port to `point` within `max_dist`, scanning the
/// given candidate elements. Hidden elements never offer ports.
#[must_use]
pub fn nearest_port(
    store: &ElementStore,
    candidates: &[ElementId],
    point: Point,
    max_dist: f64,
) -> Option<PortRef> {
    let mut best: Option<(f64, PortRef)> = None;
    let limit_sq = max_dist * max_dist;
    for &id in candidates {
        let Some(element) = store.get(id) else {
            continue;
        };
        if element.hidden || !element.kind.has_ports() {
            continue;
        }
        let (dx, dy) = store.parent_offset(element);
        for (kind, local) in local_ports(element) {
            let world = local.offset(dx, dy);
            let d = point.dist_sq(world);
            if d <= limit_sq && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, PortRef { element: id, port: kind }));
            }
        }
    }
    best.map(|(_, port)| port)
}

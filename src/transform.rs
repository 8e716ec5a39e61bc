//! Normalization of interactive transforms back into persisted geometry.
//!
//! During a resize/rotate gesture the host layer accumulates a transient
//! visual scale and rotation on top of the stored geometry. On gesture end
//! that transform is folded into width/height (or radii, or stroke points)
//! and the transient scale returns to identity, so repeated gestures never
//! compound. Folding an identity transform is a no-op on geometry, which is
//! what makes normalization idempotent.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::consts::MIN_SIZE;
use crate::element::{Element, ElementKind, ElementPatch};
use crate::geom::Point;

/// Transient visual transform accumulated during a gesture, relative to the
/// element's persisted geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Final absolute rotation in degrees, not a delta.
    pub rotation: f64,
}

impl AppliedTransform {
    #[must_use]
    pub fn identity() -> Self {
        Self { scale_x: 1.0, scale_y: 1.0, rotation: 0.0 }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }
}

/// Scale factor actually applied: magnitude only, and gestures that produce
/// a non-finite factor fold as identity.
fn sanitize(scale: f64) -> f64 {
    if scale.is_finite() && scale.abs() > 0.0 {
        scale.abs()
    } else {
        1.0
    }
}

fn scaled(value: f64, scale: f64) -> f64 {
    (value * scale).max(MIN_SIZE)
}

/// Fold a transient transform into a single sparse mutation for the store.
///
/// Width/height kinds scale their extents, ellipses scale their radii, and
/// strokes scale every point about the element origin. The final rotation
/// is always persisted, so an identity-scale gesture still commits a
/// rotation change.
#[must_use]
pub fn normalize(el: &Element, transform: AppliedTransform) -> ElementPatch {
    let sx = sanitize(transform.scale_x);
    let sy = sanitize(transform.scale_y);
    let mut patch = ElementPatch {
        rotation: Some(if transform.rotation.is_finite() { transform.rotation } else { el.rotation }),
        ..ElementPatch::default()
    };
    match &el.kind {
        ElementKind::Rectangle { width, height }
        | ElementKind::Text { width, height, .. }
        | ElementKind::Sticky { width, height, .. }
        | ElementKind::Table { width, height, .. }
        | ElementKind::Image { width, height, .. }
        | ElementKind::Section { width, height } => {
            patch.width = Some(scaled(*width, sx));
            patch.height = Some(scaled(*height, sy));
        }
        ElementKind::Ellipse { radius_x, radius_y } => {
            patch.radius_x = Some(scaled(*radius_x, sx));
            patch.radius_y = Some(scaled(*radius_y, sy));
        }
        ElementKind::Stroke { points, .. } => {
            if sx != 1.0 || sy != 1.0 {
                patch.points =
                    Some(points.iter().map(|p| Point::new(p.x * sx, p.y * sy)).collect());
            }
        }
    }
    patch
}

//! Viewport culling with level-of-detail bucketing.
//!
//! The culler expands the visible world rectangle by a fixed screen-space
//! buffer (so elements do not pop in at the edges), asks the spatial index
//! for candidates, and refines them against exact world bounds. Selected
//! elements are always included, whatever the zoom.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use std::collections::HashSet;

use crate::consts::{CULL_BUFFER_PX, LOD_FULL_ZOOM, LOD_PLACEHOLDER_ZOOM, LOD_SIMPLIFIED_ZOOM};
use crate::element::ElementId;
use crate::geom::Rect;
use crate::spatial::SpatialIndex;
use crate::store::ElementStore;

/// The visible world rectangle plus zoom.
///
/// `zoom` is the world-to-screen scale factor (1.0 = no zoom); screen-space
/// distances divide by it to become world distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64, zoom: f64) -> Self {
        Self { x, y, width, height, zoom }
    }

    /// The visible world rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Zoom clamped away from zero so screen-to-world division stays finite.
    #[must_use]
    pub fn safe_zoom(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > f64::EPSILON {
            self.zoom
        } else {
            f64::EPSILON
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.safe_zoom()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 1.0)
    }
}

/// How much rendering detail the current zoom warrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    /// Full detail.
    Full,
    /// Simplified rendering (skip decorations, coarse strokes).
    Simplified,
    /// Placeholder boxes only.
    Placeholder,
    /// Not rendered at all, except for selected elements.
    Hidden,
}

/// LOD bucket for a zoom level.
#[must_use]
pub fn lod_for_zoom(zoom: f64) -> Lod {
    if zoom >= LOD_FULL_ZOOM {
        Lod::Full
    } else if zoom >= LOD_SIMPLIFIED_ZOOM {
        Lod::Simplified
    } else if zoom >= LOD_PLACEHOLDER_ZOOM {
        Lod::Placeholder
    } else {
        Lod::Hidden
    }
}

/// Result of a culling pass: the ids to render and the detail hint.
#[derive(Debug, Clone)]
pub struct CullResult {
    /// Ids intersecting the buffered viewport (plus the selection),
    /// excluding hidden elements.
    pub visible: Vec<ElementId>,
    /// Detail bucket for this zoom.
    pub lod: Lod,
}

/// Cull the scene against a viewport.
///
/// The index must already be reconciled with the store; the engine
/// guarantees that by rebuilding before queries. Hidden elements are
/// dropped; selected elements are always present regardless of bounds or
/// zoom.
#[must_use]
pub fn cull(
    store: &ElementStore,
    index: &SpatialIndex,
    viewport: &Viewport,
    selection: &HashSet<ElementId>,
) -> CullResult {
    let lod = lod_for_zoom(viewport.zoom);
    let mut visible: Vec<ElementId> = Vec::new();
    if lod != Lod::Hidden {
        let buffer = viewport.screen_dist_to_world(CULL_BUFFER_PX);
        let query_rect = viewport.rect().expand(buffer);
        for id in index.query(&query_rect) {
            let Some(el) = store.get(id) else {
                continue;
            };
            if el.hidden {
                continue;
            }
            let Some(bounds) = store.world_bounds(id) else {
                continue;
            };
            if bounds.intersects(&query_rect) {
                visible.push(id);
            }
        }
    }
    for &id in selection {
        if !visible.contains(&id) && store.get(id).is_some() {
            visible.push(id);
        }
    }
    CullResult { visible, lod }
}

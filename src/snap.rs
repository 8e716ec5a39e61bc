//! Snapping: grid corners, element anchors, and alignment guides.
//!
//! All candidates within a zoom-scaled threshold compete on
//! `distance / strength`, so a strong candidate (an element anchor) can win
//! over a slightly closer weak one (a bare grid corner). A small secondary
//! capture radius keeps the current target sticky, preventing flicker
//! between two near-equidistant candidates mid-drag.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use std::collections::HashSet;

use crate::consts::{
    ANCHOR_STRENGTH, DEFAULT_GRID_SIZE, GRID_STRENGTH, GUIDE_STRENGTH, SNAP_HYSTERESIS_RATIO,
    SNAP_THRESHOLD_PX,
};
use crate::element::ElementId;
use crate::geom::Point;
use crate::store::ElementStore;

/// Tunables for the snap engine.
#[derive(Debug, Clone, Copy)]
pub struct SnapConfig {
    /// Grid cell size in world units. Zero or negative disables grid snaps.
    pub grid_size: f64,
    /// Capture threshold in screen pixels.
    pub threshold_px: f64,
    /// Secondary capture radius as a fraction of the threshold.
    pub hysteresis_ratio: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            threshold_px: SNAP_THRESHOLD_PX,
            hysteresis_ratio: SNAP_HYSTERESIS_RATIO,
        }
    }
}

/// What a snapped point is attracted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapGuide {
    /// A grid cell corner.
    Grid { corner: Point },
    /// An element anchor: corner, edge midpoint, or center.
    Anchor { element: ElementId, point: Point },
    /// A shared vertical line (element left/center/right).
    AlignX { element: ElementId, x: f64 },
    /// A shared horizontal line (element top/center/bottom).
    AlignY { element: ElementId, y: f64 },
}

/// Result of a snap query.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// Whether any candidate captured the point.
    pub snapped: bool,
    /// The output point: the winning target, or the input unchanged.
    pub point: Point,
    /// The guides that produced the output, empty when not snapped.
    pub guides: Vec<SnapGuide>,
}

impl SnapResult {
    fn miss(point: Point) -> Self {
        Self { snapped: false, point, guides: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: Point,
    score: f64,
    guide: SnapGuide,
}

/// Snap engine with per-gesture hysteresis state.
#[derive(Debug)]
pub struct SnapEngine {
    config: SnapConfig,
    held: Option<SnapResult>,
}

impl SnapEngine {
    #[must_use]
    pub fn new(config: SnapConfig) -> Self {
        Self { config, held: None }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> SnapConfig {
        self.config
    }

    /// Replace the configuration and drop any held target.
    pub fn set_config(&mut self, config: SnapConfig) {
        self.config = config;
        self.held = None;
    }

    /// Forget the held target. Call at gesture end.
    pub fn reset(&mut self) {
        self.held = None;
    }

    /// Snap `point` against the grid and the anchors/guides of every
    /// element not in `exclude`. The threshold scales with `zoom` so it is
    /// a constant number of screen pixels.
    pub fn snap(
        &mut self,
        store: &ElementStore,
        point: Point,
        exclude: &HashSet<ElementId>,
        zoom: f64,
    ) -> SnapResult {
        let zoom = if zoom.is_finite() && zoom > f64::EPSILON { zoom } else { 1.0 };
        let threshold = self.config.threshold_px / zoom;

        // Hysteresis: while the live cursor stays within the secondary
        // radius of the held target, keep returning that target. A held
        // target whose element is gone, hidden, or newly excluded is stale
        // and must not keep attracting.
        if let Some(held) = &self.held {
            let secondary = threshold * self.config.hysteresis_ratio;
            if point.dist(held.point) <= secondary && held_valid(store, exclude, held) {
                return held.clone();
            }
        }

        let result = self.compute(store, point, exclude, threshold);
        self.held = if result.snapped { Some(result.clone()) } else { None };
        result
    }

    fn compute(
        &self,
        store: &ElementStore,
        point: Point,
        exclude: &HashSet<ElementId>,
        threshold: f64,
    ) -> SnapResult {
        let mut best_full: Option<Candidate> = None;
        let mut best_x: Option<Candidate> = None;
        let mut best_y: Option<Candidate> = None;

        if self.config.grid_size > 0.0 {
            let g = self.config.grid_size;
            let corner = Point::new((point.x / g).round() * g, (point.y / g).round() * g);
            let dist = point.dist(corner);
            if dist <= threshold {
                consider(&mut best_full, Candidate {
                    point: corner,
                    score: dist / GRID_STRENGTH,
                    guide: SnapGuide::Grid { corner },
                });
            }
        }

        for el in store.elements() {
            if el.hidden || exclude.contains(&el.id) {
                continue;
            }
            let Some(bounds) = store.world_bounds(el.id) else {
                continue;
            };
            let xs = [bounds.x, bounds.center().x, bounds.max_x()];
            let ys = [bounds.y, bounds.center().y, bounds.max_y()];
            for &ax in &xs {
                for &ay in &ys {
                    let anchor = Point::new(ax, ay);
                    let dist = point.dist(anchor);
                    if dist <= threshold {
                        consider(&mut best_full, Candidate {
                            point: anchor,
                            score: dist / ANCHOR_STRENGTH,
                            guide: SnapGuide::Anchor { element: el.id, point: anchor },
                        });
                    }
                }
            }
            for &gx in &xs {
                let dist = (point.x - gx).abs();
                if dist <= threshold {
                    consider(&mut best_x, Candidate {
                        point: Point::new(gx, point.y),
                        score: dist / GUIDE_STRENGTH,
                        guide: SnapGuide::AlignX { element: el.id, x: gx },
                    });
                }
            }
            for &gy in &ys {
                let dist = (point.y - gy).abs();
                if dist <= threshold {
                    consider(&mut best_y, Candidate {
                        point: Point::new(point.x, gy),
                        score: dist / GUIDE_STRENGTH,
                        guide: SnapGuide::AlignY { element: el.id, y: gy },
                    });
                }
            }
        }

        let axis_score = match (&best_x, &best_y) {
            (Some(a), Some(b)) => Some(a.score.min(b.score)),
            (Some(a), None) => Some(a.score),
            (None, Some(b)) => Some(b.score),
            (None, None) => None,
        };

        match (best_full, axis_score) {
            (Some(full), Some(axis)) if full.score <= axis => hit_full(full),
            (Some(full), None) => hit_full(full),
            (None, None) => SnapResult::miss(point),
            _ => hit_axes(point, best_x, best_y),
        }
    }
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(SnapConfig::default())
    }
}

fn held_valid(store: &ElementStore, exclude: &HashSet<ElementId>, held: &SnapResult) -> bool {
    held.guides.iter().all(|guide| match guide {
        SnapGuide::Grid { .. } => true,
        SnapGuide::Anchor { element, .. }
        | SnapGuide::AlignX { element, .. }
        | SnapGuide::AlignY { element, .. } => store
            .get(*element)
            .is_some_and(|el| !el.hidden && !exclude.contains(element)),
    })
}

fn consider(slot: &mut Option<Candidate>, candidate: Candidate) {
    if slot.map_or(true, |held| candidate.score < held.score) {
        *slot = Some(candidate);
    }
}

fn hit_full(full: Candidate) -> SnapResult {
    SnapResult { snapped: true, point: full.point, guides: vec![full.guide] }
}

fn hit_axes(point: Point, best_x: Option<Candidate>, best_y: Option<Candidate>) -> SnapResult {
    let mut out = point;
    let mut guides = Vec::new();
    if let Some(cx) = best_x {
        out.x = cx.point.x;
        guides.push(cx.guide);
    }
    if let Some(cy) = best_y {
        out.y = cy.point.y;
        guides.push(cy.guide);
    }
    SnapResult { snapped: true, point: out, guides }
}

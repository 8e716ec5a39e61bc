//! Element and edge data model.
//!
//! Elements are a closed tagged union over shape kinds; every consumer
//! matches exhaustively, so adding a kind is a compile error at each site
//! that cares (bounds, ports, erasability, normalization). Edges reference
//! elements by id only — never by direct object reference — so removal and
//! serialization never deal with cycles.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::MIN_SIZE;
use crate::geom::{Point, Rect};

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Unique identifier for an edge (connector).
pub type EdgeId = Uuid;

/// Clamp a size field to a finite value of at least [`MIN_SIZE`].
///
/// Invalid geometry is corrected locally, never propagated as a failure.
#[must_use]
pub fn clamp_size(value: f64) -> f64 {
    if value.is_finite() && value >= MIN_SIZE {
        value
    } else {
        MIN_SIZE
    }
}

/// The kind of an element, carrying its kind-specific geometry and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Axis-aligned rectangle; position is the top-left corner.
    Rectangle { width: f64, height: f64 },
    /// Ellipse; position is the center.
    Ellipse { radius_x: f64, radius_y: f64 },
    /// Plain text block.
    Text { content: String, width: f64, height: f64 },
    /// Sticky note.
    Sticky { text: String, width: f64, height: f64 },
    /// Grid of cells.
    Table { rows: u32, columns: u32, width: f64, height: f64 },
    /// Bitmap reference; the engine only tracks its bounds.
    Image { source: String, width: f64, height: f64 },
    /// A container whose children store section-relative coordinates.
    Section { width: f64, height: f64 },
    /// Freehand stroke; points are relative to the element position.
    Stroke { points: Vec<Point>, stroke_width: f64 },
}

impl ElementKind {
    /// Bounding box in the element's own coordinate space, given its
    /// position. Ellipse positions are centers; everything else is top-left.
    #[must_use]
    pub fn bounds_at(&self, x: f64, y: f64) -> Rect {
        match self {
            Self::Rectangle { width, height }
            | Self::Text { width, height, .. }
            | Self::Sticky { width, height, .. }
            | Self::Table { width, height, .. }
            | Self::Image { width, height, .. }
            | Self::Section { width, height } => Rect::new(x, y, *width, *height),
            Self::Ellipse { radius_x, radius_y } => Rect::new(
                x - radius_x,
                y - radius_y,
                radius_x * 2.0,
                radius_y * 2.0,
            ),
            Self::Stroke { points, stroke_width } => {
                let mut r = points
                    .iter()
                    .map(|p| Rect::new(x + p.x, y + p.y, 0.0, 0.0))
                    .reduce(|a, b| a.union(&b))
                    .unwrap_or(Rect::new(x, y, 0.0, 0.0));
                r = r.expand(stroke_width / 2.0);
                r
            }
        }
    }

    /// Clamp all size fields in place to finite values of at least
    /// [`MIN_SIZE`]. Stroke widths clamp to a finite non-negative value.
    pub fn clamp_sizes(&mut self) {
        match self {
            Self::Rectangle { width, height }
            | Self::Text { width, height, .. }
            | Self::Sticky { width, height, .. }
            | Self::Table { width, height, .. }
            | Self::Image { width, height, .. }
            | Self::Section { width, height } => {
                *width = clamp_size(*width);
                *height = clamp_size(*height);
            }
            Self::Ellipse { radius_x, radius_y } => {
                *radius_x = clamp_size(*radius_x);
                *radius_y = clamp_size(*radius_y);
            }
            Self::Stroke { stroke_width, .. } => {
                if !stroke_width.is_finite() || *stroke_width < 0.0 {
                    *stroke_width = MIN_SIZE;
                }
            }
        }
    }

    /// Whether this kind exposes attachment ports.
    ///
    /// Ellipses expose perimeter ports; rectangle-like container kinds
    /// expose edge-midpoint ports; free-form kinds expose none.
    #[must_use]
    pub fn has_ports(&self) -> bool {
        match self {
            Self::Rectangle { .. }
            | Self::Ellipse { .. }
            | Self::Sticky { .. }
            | Self::Image { .. }
            | Self::Section { .. } => true,
            Self::Text { .. } | Self::Table { .. } | Self::Stroke { .. } => false,
        }
    }
}

/// An element as stored in the document and in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// X position: top-left for rectangular kinds, center for ellipses.
    /// Relative to the parent section's origin while `parent` is set.
    pub x: f64,
    /// Y position, same semantics as `x`.
    pub y: f64,
    /// Clockwise rotation in degrees around the bounds center.
    pub rotation: f64,
    /// Stacking order; lower values draw beneath higher values.
    pub z_index: i64,
    /// Owning section, if any.
    pub parent: Option<ElementId>,
    /// Locked elements ignore erasure and interactive edits by convention.
    pub locked: bool,
    /// Hidden elements are skipped by culling, snapping, and erasure.
    pub hidden: bool,
    /// Logical tick at creation, assigned by the store clock.
    pub created_at: u64,
    /// Logical tick of the last mutation.
    pub updated_at: u64,
    /// Kind-specific geometry and content.
    pub kind: ElementKind,
}

impl Element {
    /// New element at a position with fresh id and zeroed bookkeeping.
    #[must_use]
    pub fn new(x: f64, y: f64, kind: ElementKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            rotation: 0.0,
            z_index: 0,
            parent: None,
            locked: false,
            hidden: false,
            created_at: 0,
            updated_at: 0,
            kind,
        }
    }

    /// Bounding box in the element's own coordinate space (parent-relative
    /// while attached to a section).
    #[must_use]
    pub fn local_bounds(&self) -> Rect {
        self.kind.bounds_at(self.x, self.y)
    }
}

/// Sparse update for an element. Only present fields are applied; fields
/// that do not apply to the target's kind are ignored.
#[derive(Debug, Clone, Default)]
pub struct ElementPatch {
    /// New x position.
    pub x: Option<f64>,
    /// New y position.
    pub y: Option<f64>,
    /// New rotation in degrees.
    pub rotation: Option<f64>,
    /// New z-index.
    pub z_index: Option<i64>,
    /// Attach to a section (`Some(Some(id))`) or detach (`Some(None)`).
    pub parent: Option<Option<ElementId>>,
    /// New locked flag.
    pub locked: Option<bool>,
    /// New hidden flag.
    pub hidden: Option<bool>,
    /// New width, for kinds that have one.
    pub width: Option<f64>,
    /// New height, for kinds that have one.
    pub height: Option<f64>,
    /// New horizontal radius, for ellipses.
    pub radius_x: Option<f64>,
    /// New vertical radius, for ellipses.
    pub radius_y: Option<f64>,
    /// Replacement point list, for strokes.
    pub points: Option<Vec<Point>>,
    /// Replacement text content, for text/sticky kinds.
    pub content: Option<String>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Patch that resizes width/height (or radii, applied to ellipses).
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }
}

/// A named attachment point on an element's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    N,
    S,
    E,
    W,
    Center,
}

impl PortKind {
    /// Outward unit normal of the port, `(0, 0)` for `Center`.
    #[must_use]
    pub fn outward_normal(self) -> (f64, f64) {
        match self {
            Self::N => (0.0, -1.0),
            Self::S => (0.0, 1.0),
            Self::E => (1.0, 0.0),
            Self::W => (-1.0, 0.0),
            Self::Center => (0.0, 0.0),
        }
    }
}

/// A resolved reference to a port on a specific element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    /// The element carrying the port.
    pub element: ElementId,
    /// Which port on that element.
    pub port: PortKind,
}

/// One end of an edge: attached to a port, or free-floating in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attach", rename_all = "lowercase")]
pub enum EdgeEndpoint {
    /// Attached to a port; follows the element as it moves.
    Port(PortRef),
    /// Fixed world position.
    Free(Point),
}

impl EdgeEndpoint {
    /// The element this endpoint is attached to, if any.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Port(port) => Some(port.element),
            Self::Free(_) => None,
        }
    }
}

/// How an edge's path is computed between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Direct two-point segment.
    Straight,
    /// Axis-aligned path with port clearance stubs.
    Orthogonal,
    /// Flattened quadratic arc.
    Curved,
}

/// A connector between two endpoints with a cached flattened path.
///
/// Cached `points` are valid only between the last reflow and the next
/// mutation of either connected element; staleness is tracked by membership
/// in the store's dirty-edge set, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier.
    pub id: EdgeId,
    /// Where the edge starts.
    pub source: EdgeEndpoint,
    /// Where the edge ends.
    pub target: EdgeEndpoint,
    /// Routing mode.
    pub mode: RouteMode,
    /// Cached flattened path in world coordinates.
    pub points: Vec<Point>,
}

impl Edge {
    /// New edge with a fresh id and an empty cached path.
    #[must_use]
    pub fn new(source: EdgeEndpoint, target: EdgeEndpoint, mode: RouteMode) -> Self {
        Self { id: Uuid::new_v4(), source, target, mode, points: Vec::new() }
    }

    /// Whether either endpoint is attached to the given element.
    #[must_use]
    pub fn references(&self, id: ElementId) -> bool {
        self.source.element() == Some(id) || self.target.element() == Some(id)
    }
}

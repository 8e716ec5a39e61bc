//! Authoritative element/edge store.
//!
//! `ElementStore` is the single source of truth for scene data. The spatial
//! index, router, and history manager hold only identifiers into it, never
//! copies. Every mutation flows through here and maintains two pieces of
//! derived-state bookkeeping: the spatial-dirty flag (the index must rebuild
//! before its next query) and the dirty-edge set (those connectors must be
//! rerouted before their cached paths are trusted again).
//!
//! The store is an explicitly constructed value with no ambient state, so
//! tests can create and drop scenes deterministically.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{HashMap, HashSet};

use crate::element::{
    Edge, EdgeEndpoint, EdgeId, Element, ElementId, ElementKind, ElementPatch,
};
use crate::geom::{Point, Rect};

/// Maximum section nesting depth honored when resolving world coordinates.
/// Chains deeper than this (including accidental cycles) are cut off.
const MAX_PARENT_DEPTH: usize = 64;

/// In-memory store of elements and edges with mutation bookkeeping.
#[derive(Debug)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    edges: HashMap<EdgeId, Edge>,
    dirty_edges: HashSet<EdgeId>,
    spatial_dirty: bool,
    clock: u64,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
            edges: HashMap::new(),
            dirty_edges: HashSet::new(),
            spatial_dirty: false,
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    // --- Element mutations ---

    /// Add an element, clamping invalid geometry and stamping timestamps.
    /// Returns the element's id.
    pub fn add(&mut self, mut element: Element) -> ElementId {
        element.kind.clamp_sizes();
        let now = self.tick();
        element.created_at = now;
        element.updated_at = now;
        let id = element.id;
        self.elements.insert(id, element);
        self.spatial_dirty = true;
        self.mark_edges_of(id);
        id
    }

    /// Apply a sparse update. Returns false if the element does not exist.
    ///
    /// Size fields are clamped rather than rejected; non-finite positions
    /// and rotations are ignored. Patch fields that do not apply to the
    /// element's kind are ignored.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let now = self.tick();
        let Some(el) = self.elements.get_mut(&id) else {
            return false;
        };
        if let Some(x) = patch.x {
            if x.is_finite() {
                el.x = x;
            }
        }
        if let Some(y) = patch.y {
            if y.is_finite() {
                el.y = y;
            }
        }
        if let Some(rotation) = patch.rotation {
            if rotation.is_finite() {
                el.rotation = rotation;
            }
        }
        if let Some(z) = patch.z_index {
            el.z_index = z;
        }
        if let Some(parent) = patch.parent {
            el.parent = parent;
        }
        if let Some(locked) = patch.locked {
            el.locked = locked;
        }
        if let Some(hidden) = patch.hidden {
            el.hidden = hidden;
        }
        apply_kind_patch(&mut el.kind, patch);
        el.kind.clamp_sizes();
        el.updated_at = now;
        self.spatial_dirty = true;
        self.mark_edges_of(id);
        true
    }

    /// Remove an element, detaching any connectors attached to it.
    ///
    /// Each attached endpoint becomes a free endpoint frozen at its last
    /// routed world position (or the element's bounds center when the edge
    /// was never routed), so the connector survives the removal.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let fallback = self.world_bounds(id).map(|b| b.center());
        let element = self.elements.remove(&id)?;
        self.spatial_dirty = true;
        let affected: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.references(id))
            .map(|e| e.id)
            .collect();
        for edge_id in affected {
            if let Some(edge) = self.edges.get_mut(&edge_id) {
                detach_endpoint(&mut edge.source, id, edge.points.first().copied(), fallback);
                detach_endpoint(&mut edge.target, id, edge.points.last().copied(), fallback);
                self.dirty_edges.insert(edge_id);
            }
        }
        Some(element)
    }

    // --- Element queries ---

    /// Look up an element by id.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Iterate all elements in unspecified order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// All elements sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn sorted_elements(&self) -> Vec<&Element> {
        let mut all: Vec<&Element> = self.elements.values().collect();
        all.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Number of elements in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the store holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// World-space translation contributed by an element's section chain.
    #[must_use]
    pub fn parent_offset(&self, element: &Element) -> (f64, f64) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        let mut current = element.parent;
        for _ in 0..MAX_PARENT_DEPTH {
            let Some(parent_id) = current else {
                break;
            };
            let Some(parent) = self.elements.get(&parent_id) else {
                break;
            };
            dx += parent.x;
            dy += parent.y;
            current = parent.parent;
        }
        (dx, dy)
    }

    /// Bounding box of an element in world coordinates, resolving the
    /// section chain.
    #[must_use]
    pub fn world_bounds(&self, id: ElementId) -> Option<Rect> {
        let el = self.elements.get(&id)?;
        let (dx, dy) = self.parent_offset(el);
        let local = el.local_bounds();
        Some(Rect::new(local.x + dx, local.y + dy, local.width, local.height))
    }

    // --- Edge mutations ---

    /// Add an edge and mark it for routing. Returns the edge's id.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id;
        self.edges.insert(id, edge);
        self.dirty_edges.insert(id);
        id
    }

    /// Replace an endpoint of an existing edge and mark it for routing.
    /// Returns false if the edge does not exist.
    pub fn set_edge_endpoint(&mut self, id: EdgeId, target_end: bool, endpoint: EdgeEndpoint) -> bool {
        let Some(edge) = self.edges.get_mut(&id) else {
            return false;
        };
        if target_end {
            edge.target = endpoint;
        } else {
            edge.source = endpoint;
        }
        self.dirty_edges.insert(id);
        true
    }

    /// Store a freshly routed path for an edge. Used by the router only;
    /// does not dirty anything.
    pub fn set_edge_points(&mut self, id: EdgeId, points: Vec<Point>) -> bool {
        let Some(edge) = self.edges.get_mut(&id) else {
            return false;
        };
        edge.points = points;
        true
    }

    /// Remove an edge, returning it if present.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.dirty_edges.remove(&id);
        self.edges.remove(&id)
    }

    // --- Edge queries ---

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Iterate all edges in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Ids of all edges attached to the given element.
    #[must_use]
    pub fn edges_of(&self, id: ElementId) -> Vec<EdgeId> {
        self.edges
            .values()
            .filter(|e| e.references(id))
            .map(|e| e.id)
            .collect()
    }

    /// Number of edges in the store.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // --- Dirty bookkeeping ---

    /// Whether the spatial index must rebuild before its next query.
    #[must_use]
    pub fn is_spatial_dirty(&self) -> bool {
        self.spatial_dirty
    }

    /// Force a rebuild before the next spatial query.
    pub fn mark_spatial_dirty(&mut self) {
        self.spatial_dirty = true;
    }

    /// Acknowledge a completed rebuild.
    pub fn clear_spatial_dirty(&mut self) {
        self.spatial_dirty = false;
    }

    /// Mark a single edge as needing rerouting.
    pub fn mark_edge_dirty(&mut self, id: EdgeId) {
        if self.edges.contains_key(&id) {
            self.dirty_edges.insert(id);
        }
    }

    /// Drain the dirty-edge set for one reflow pass.
    pub fn take_dirty_edges(&mut self) -> Vec<EdgeId> {
        self.dirty_edges.drain().collect()
    }

    /// Whether any edge is awaiting reroute.
    #[must_use]
    pub fn has_dirty_edges(&self) -> bool {
        !self.dirty_edges.is_empty()
    }

    fn mark_edges_of(&mut self, id: ElementId) {
        for edge in self.edges.values() {
            if edge.references(id) {
                self.dirty_edges.insert(edge.id);
            }
        }
    }

    // --- History replay paths ---
    //
    // Undo/redo restore recorded states verbatim: no clamping, no timestamp
    // stamping, no detach policy. Dirty bookkeeping still applies so the
    // index rebuilds and touched edges reroute.

    /// Reinsert an element exactly as recorded.
    pub fn restore_element(&mut self, element: Element) {
        let id = element.id;
        self.elements.insert(id, element);
        self.spatial_dirty = true;
        self.mark_edges_of(id);
    }

    /// Remove an element without the endpoint-detach policy.
    pub fn purge_element(&mut self, id: ElementId) -> Option<Element> {
        let element = self.elements.remove(&id)?;
        self.spatial_dirty = true;
        self.mark_edges_of(id);
        Some(element)
    }

    /// Reinsert an edge exactly as recorded and mark it for reroute.
    pub fn restore_edge(&mut self, edge: Edge) {
        let id = edge.id;
        self.edges.insert(id, edge);
        self.dirty_edges.insert(id);
    }

    /// Remove an edge during history replay.
    pub fn purge_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.dirty_edges.remove(&id);
        self.edges.remove(&id)
    }

    // --- Hydration ---

    /// Replace the full store contents from a snapshot. The spatial index
    /// is marked for rebuild; cached edge paths are trusted as-is.
    pub fn load(&mut self, elements: Vec<Element>, edges: Vec<Edge>) {
        self.elements.clear();
        self.edges.clear();
        self.dirty_edges.clear();
        for el in elements {
            self.elements.insert(el.id, el);
        }
        for edge in edges {
            self.edges.insert(edge.id, edge);
        }
        self.spatial_dirty = true;
    }
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply the kind-specific fields of a patch. Fields that do not apply to
/// the element's kind are ignored.
fn apply_kind_patch(kind: &mut ElementKind, patch: &ElementPatch) {
    match kind {
        ElementKind::Rectangle { width, height }
        | ElementKind::Table { width, height, .. }
        | ElementKind::Image { width, height, .. }
        | ElementKind::Section { width, height } => {
            if let Some(w) = patch.width {
                *width = w;
            }
            if let Some(h) = patch.height {
                *height = h;
            }
        }
        ElementKind::Text { content, width, height } => {
            if let Some(w) = patch.width {
                *width = w;
            }
            if let Some(h) = patch.height {
                *height = h;
            }
            if let Some(ref text) = patch.content {
                content.clone_from(text);
            }
        }
        ElementKind::Sticky { text, width, height } => {
            if let Some(w) = patch.width {
                *width = w;
            }
            if let Some(h) = patch.height {
                *height = h;
            }
            if let Some(ref new_text) = patch.content {
                text.clone_from(new_text);
            }
        }
        ElementKind::Ellipse { radius_x, radius_y } => {
            if let Some(rx) = patch.radius_x {
                *radius_x = rx;
            }
            if let Some(ry) = patch.radius_y {
                *radius_y = ry;
            }
        }
        ElementKind::Stroke { points, .. } => {
            if let Some(ref new_points) = patch.points {
                points.clone_from(new_points);
            }
        }
    }
}

/// Detach one endpoint from a removed element, freezing it at the edge's
/// last routed position for that end, or at the removed element's center.
fn detach_endpoint(
    endpoint: &mut EdgeEndpoint,
    removed: ElementId,
    cached: Option<Point>,
    fallback: Option<Point>,
) {
    if endpoint.element() != Some(removed) {
        return;
    }
    let frozen = cached.or(fallback).unwrap_or(Point::new(0.0, 0.0));
    *endpoint = EdgeEndpoint::Free(frozen);
}

//! Quadtree spatial index over element bounds.
//!
//! The index is derived state: it is rebuilt in full from the store whenever
//! the store's spatial-dirty flag is set, rather than updated incrementally
//! per mutation. Mutations are batched per gesture, so the O(n) rebuild is
//! paid rarely, and the full rebuild rules out incremental-update drift
//! between store and index.
//!
//! Queries return a superset of the exact answer (entries whose boxes
//! intersect the query rect); callers refine with exact geometry tests.

#[cfg(test)]
#[path = "spatial_test.rs"]
mod spatial_test;

use std::collections::HashSet;

use crate::element::ElementId;
use crate::geom::Rect;

/// Entries per node before it subdivides.
const MAX_ENTRIES_PER_NODE: usize = 8;

/// Maximum subdivision depth.
const MAX_DEPTH: u32 = 8;

#[derive(Debug)]
struct QuadNode {
    bounds: Rect,
    /// Entries held at this level: those that straddle children, plus
    /// everything while the node is a leaf.
    entries: Vec<(ElementId, Rect)>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    fn new(bounds: Rect) -> Self {
        Self { bounds, entries: Vec::new(), children: None }
    }

    fn insert(&mut self, id: ElementId, item: Rect, depth: u32) {
        if self.children.is_none()
            && depth < MAX_DEPTH
            && self.entries.len() >= MAX_ENTRIES_PER_NODE
        {
            self.subdivide();
        }
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                if child.bounds.contains_rect(&item) {
                    child.insert(id, item, depth + 1);
                    return;
                }
            }
        }
        self.entries.push((id, item));
    }

    fn subdivide(&mut self) {
        let c = self.bounds.center();
        let b = self.bounds;
        self.children = Some(Box::new([
            QuadNode::new(Rect::new(b.x, b.y, c.x - b.x, c.y - b.y)),
            QuadNode::new(Rect::new(c.x, b.y, b.max_x() - c.x, c.y - b.y)),
            QuadNode::new(Rect::new(b.x, c.y, c.x - b.x, b.max_y() - c.y)),
            QuadNode::new(Rect::new(c.x, c.y, b.max_x() - c.x, b.max_y() - c.y)),
        ]));
        let held: Vec<(ElementId, Rect)> = std::mem::take(&mut self.entries);
        for (id, item) in held {
            let mut placed = false;
            if let Some(children) = &mut self.children {
                for child in children.iter_mut() {
                    if child.bounds.contains_rect(&item) {
                        child.entries.push((id, item));
                        placed = true;
                        break;
                    }
                }
            }
            if !placed {
                self.entries.push((id, item));
            }
        }
    }

    fn remove(&mut self, id: ElementId, item: &Rect) -> bool {
        if let Some(pos) = self.entries.iter().position(|(e, _)| *e == id) {
            self.entries.swap_remove(pos);
            return true;
        }
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                if child.bounds.intersects(item) && child.remove(id, item) {
                    return true;
                }
            }
        }
        false
    }

    fn query(&self, rect: &Rect, out: &mut HashSet<ElementId>) {
        for (id, item) in &self.entries {
            if item.intersects(rect) {
                out.insert(*id);
            }
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.bounds.intersects(rect) {
                    child.query(rect, out);
                }
            }
        }
    }
}

/// Quadtree index from element ids to their world bounds.
#[derive(Debug)]
pub struct SpatialIndex {
    root: QuadNode,
    count: usize,
}

impl SpatialIndex {
    /// Empty index covering the given world region. Entries outside the
    /// region are still stored (at the root) and remain queryable.
    #[must_use]
    pub fn new(world: Rect) -> Self {
        Self { root: QuadNode::new(world), count: 0 }
    }

    /// Build an index from `(id, bounds)` pairs, sizing the root to the
    /// union of all bounds.
    #[must_use]
    pub fn build(items: &[(ElementId, Rect)]) -> Self {
        let world = items
            .iter()
            .map(|(_, r)| *r)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let mut index = Self::new(world);
        for (id, rect) in items {
            index.insert(*id, *rect);
        }
        index
    }

    /// Insert an entry. An id may appear once; callers remove before
    /// re-inserting a moved element.
    pub fn insert(&mut self, id: ElementId, bounds: Rect) {
        self.root.insert(id, bounds, 0);
        self.count += 1;
    }

    /// Remove an entry by id, guided by the bounds it was inserted with.
    /// Returns false if the entry was not found.
    pub fn remove(&mut self, id: ElementId, bounds: Rect) -> bool {
        let removed = self.root.remove(id, &bounds);
        if removed {
            self.count -= 1;
        }
        removed
    }

    /// Ids whose stored bounds intersect `rect`. A superset candidate set;
    /// callers refine with exact geometry.
    #[must_use]
    pub fn query(&self, rect: &Rect) -> Vec<ElementId> {
        let mut out = HashSet::new();
        self.root.query(rect, &mut out);
        out.into_iter().collect()
    }

    /// Number of entries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(Rect::new(0.0, 0.0, 0.0, 0.0))
    }
}

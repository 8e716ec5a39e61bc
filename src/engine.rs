//! The scene engine facade.
//!
//! [`SceneEngine`] owns the element store and every piece of derived state:
//! the spatial index, the snap engine's held target, the undo history, the
//! current selection and viewport, and the in-flight draft. The host layer
//! drives it with world-coordinate pointer events and reads back visible
//! ids per render tick; everything else stays internal.
//!
//! Index discipline: mutations only mark the store spatially dirty, and the
//! index rebuilds lazily before the next query. A desync between index and
//! store outside a dirty window means a bookkeeping bug somewhere; it is
//! repaired with a forced rebuild rather than left to return wrong ids.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashSet;

use crate::consts::{MIN_SIZE, PORT_ATTACH_DIST};
use crate::element::{
    Edge, EdgeEndpoint, EdgeId, Element, ElementId, ElementKind, ElementPatch, PortRef, RouteMode,
};
use crate::erase;
use crate::geom::{Point, Rect};
use crate::history::{History, HistoryOp};
use crate::port;
use crate::route;
use crate::snap::{SnapConfig, SnapEngine, SnapResult};
use crate::snapshot::Snapshot;
use crate::spatial::SpatialIndex;
use crate::store::ElementStore;
use crate::transform::{self, AppliedTransform};
use crate::viewport::{cull, CullResult, Viewport};

/// What a draft gesture is building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTool {
    Rectangle,
    Ellipse,
    Sticky,
    Text,
    Section,
    Stroke,
    Connector(RouteMode),
}

/// What a committed draft produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutput {
    Element(ElementId),
    Edge(EdgeId),
}

#[derive(Debug)]
struct DraftState {
    tool: DraftTool,
    start: Point,
    element: Option<ElementId>,
    edge: Option<EdgeId>,
}

/// The whiteboard scene engine.
#[derive(Debug)]
pub struct SceneEngine {
    store: ElementStore,
    index: SpatialIndex,
    history: History,
    snap: SnapEngine,
    selection: HashSet<ElementId>,
    viewport: Viewport,
    draft: Option<DraftState>,
}

impl SceneEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: ElementStore::new(),
            index: SpatialIndex::build(&[]),
            history: History::new(),
            snap: SnapEngine::default(),
            selection: HashSet::new(),
            viewport: Viewport::new(0.0, 0.0, 1920.0, 1080.0, 1.0),
            draft: None,
        }
    }

    /// Read access to the underlying store.
    #[must_use]
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    // ── Derived-state upkeep ────────────────────────────────────

    /// Rebuild the spatial index if the store changed since the last build.
    fn ensure_index(&mut self) {
        if !self.store.is_spatial_dirty() {
            return;
        }
        let items: Vec<(ElementId, Rect)> = self
            .store
            .elements()
            .filter_map(|el| self.store.world_bounds(el.id).map(|b| (el.id, b)))
            .collect();
        self.index = SpatialIndex::build(&items);
        self.store.clear_spatial_dirty();
    }

    /// Reroute every dirty edge. Returns the number rerouted.
    pub fn reflow(&mut self) -> usize {
        route::reflow(&mut self.store)
    }

    // ── Query API ───────────────────────────────────────────────

    /// Visible element ids for the current viewport, with a detail hint.
    /// Reroutes dirty edges first so cached paths are fresh for rendering.
    pub fn visible_elements(&mut self) -> CullResult {
        self.reflow();
        self.ensure_index();
        if self.index.len() != self.store.len() {
            tracing::warn!(
                index = self.index.len(),
                store = self.store.len(),
                "spatial index out of sync with store; rebuilding"
            );
            self.store.mark_spatial_dirty();
            self.ensure_index();
        }
        cull(&self.store, &self.index, &self.viewport, &self.selection)
    }

    /// Snap a candidate point against the grid and other elements' anchors.
    pub fn snap(&mut self, point: Point, exclude: &HashSet<ElementId>) -> SnapResult {
        self.snap.snap(&self.store, point, exclude, self.viewport.zoom)
    }

    /// Current snap tunables.
    #[must_use]
    pub fn snap_config(&self) -> SnapConfig {
        self.snap.config()
    }

    /// Replace the snap tunables. Any held snap target is released.
    pub fn set_snap_config(&mut self, config: SnapConfig) {
        self.snap.set_config(config);
    }

    /// The closest attachment port within `max_dist` of `point`.
    pub fn nearest_port(&mut self, point: Point, max_dist: f64) -> Option<PortRef> {
        self.ensure_index();
        let candidates = self.index.query(&Rect::around_circle(point, max_dist));
        port::nearest_port(&self.store, &candidates, point, max_dist)
    }

    // ── Committed mutations ─────────────────────────────────────

    /// Add an element as a single undoable step.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = self.store.add(element);
        if let Some(stored) = self.store.get(id) {
            self.history.record(HistoryOp::AddElement(stored.clone()));
        }
        id
    }

    /// Patch an element as a single undoable step. Returns false when the
    /// element does not exist.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(before) = self.store.get(id).cloned() else {
            return false;
        };
        if !self.store.update(id, patch) {
            return false;
        }
        if let Some(after) = self.store.get(id).cloned() {
            self.history.record(HistoryOp::UpdateElement { before, after });
        }
        true
    }

    /// Remove an element as a single undoable step. Edges that were
    /// attached to it are detached in the same step, so undo restores their
    /// attachments along with the element.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.history.begin_gesture("remove element");
        self.remove_recorded(id);
        self.history.commit_gesture();
        self.selection.remove(&id);
        true
    }

    /// Fold an interactive transform into persisted geometry, one undoable
    /// step. Idempotent once the transient scale is back at identity.
    pub fn apply_transform(&mut self, id: ElementId, applied: AppliedTransform) -> bool {
        let Some(el) = self.store.get(id) else {
            return false;
        };
        let patch = transform::normalize(el, applied);
        self.update_element(id, &patch)
    }

    fn remove_recorded(&mut self, id: ElementId) {
        let affected = self.store.edges_of(id);
        let edges_before: Vec<Edge> = affected
            .iter()
            .filter_map(|eid| self.store.edge(*eid).cloned())
            .collect();
        let Some(removed) = self.store.remove(id) else {
            return;
        };
        for before in edges_before {
            if let Some(after) = self.store.edge(before.id).cloned() {
                self.history.record(HistoryOp::UpdateEdge { before, after });
            }
        }
        self.history.record(HistoryOp::RemoveElement(removed));
    }

    // ── Draft gestures ──────────────────────────────────────────

    /// Begin a draw gesture. Shape and stroke tools place an interim
    /// element immediately; the connector tool opens an interim edge whose
    /// source attaches to a nearby port when one is in range.
    pub fn start_draft(&mut self, tool: DraftTool, point: Point) {
        if self.draft.is_some() {
            tracing::warn!("draft already in progress; cancelling it");
            self.cancel_draft();
        }
        self.history.begin_gesture(draft_label(tool));
        let mut state =
            DraftState { tool, start: point, element: None, edge: None };
        match tool {
            DraftTool::Connector(mode) => {
                let source = self
                    .nearest_port(point, PORT_ATTACH_DIST)
                    .map_or(EdgeEndpoint::Free(point), EdgeEndpoint::Port);
                let edge = Edge::new(source, EdgeEndpoint::Free(point), mode);
                state.edge = Some(self.store.add_edge(edge));
            }
            _ => {
                state.element = Some(self.store.add(draft_seed(tool, point)));
            }
        }
        self.draft = Some(state);
    }

    /// Extend the in-flight draft to a new pointer position. Interim
    /// geometry goes straight to the store and never touches history.
    pub fn update_draft(&mut self, point: Point) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        match draft.tool {
            DraftTool::Connector(_) => {
                if let Some(edge_id) = draft.edge {
                    self.store.set_edge_endpoint(edge_id, true, EdgeEndpoint::Free(point));
                }
            }
            DraftTool::Ellipse => {
                if let Some(id) = draft.element {
                    let patch = ElementPatch {
                        x: Some((draft.start.x + point.x) / 2.0),
                        y: Some((draft.start.y + point.y) / 2.0),
                        radius_x: Some(((point.x - draft.start.x) / 2.0).abs().max(MIN_SIZE)),
                        radius_y: Some(((point.y - draft.start.y) / 2.0).abs().max(MIN_SIZE)),
                        ..ElementPatch::default()
                    };
                    self.store.update(id, &patch);
                }
            }
            DraftTool::Stroke => {
                if let Some(id) = draft.element {
                    let mut points = match self.store.get(id).map(|el| &el.kind) {
                        Some(ElementKind::Stroke { points, .. }) => points.clone(),
                        _ => Vec::new(),
                    };
                    points.push(Point::new(point.x - draft.start.x, point.y - draft.start.y));
                    let patch = ElementPatch { points: Some(points), ..ElementPatch::default() };
                    self.store.update(id, &patch);
                }
            }
            _ => {
                if let Some(id) = draft.element {
                    let rect = Rect::from_points(draft.start, point);
                    let patch = ElementPatch {
                        x: Some(rect.x),
                        y: Some(rect.y),
                        width: Some(rect.width.max(MIN_SIZE)),
                        height: Some(rect.height.max(MIN_SIZE)),
                        ..ElementPatch::default()
                    };
                    self.store.update(id, &patch);
                }
            }
        }
        self.draft = Some(draft);
    }

    /// Finish the draft, committing it as one undoable step. Connector
    /// targets attach to a port when the release point is within range.
    pub fn commit_draft(&mut self) -> Option<DraftOutput> {
        let draft = self.draft.take()?;
        self.snap.reset();
        let output = match draft.tool {
            DraftTool::Connector(_) => draft.edge.map(|edge_id| {
                if let Some(EdgeEndpoint::Free(end)) =
                    self.store.edge(edge_id).map(|e| e.target)
                {
                    if let Some(port) = self.nearest_port(end, PORT_ATTACH_DIST) {
                        self.store.set_edge_endpoint(edge_id, true, EdgeEndpoint::Port(port));
                    }
                }
                self.reflow();
                if let Some(edge) = self.store.edge(edge_id) {
                    self.history.record(HistoryOp::AddEdge(edge.clone()));
                }
                DraftOutput::Edge(edge_id)
            }),
            _ => draft.element.map(|id| {
                if let Some(el) = self.store.get(id) {
                    self.history.record(HistoryOp::AddElement(el.clone()));
                }
                DraftOutput::Element(id)
            }),
        };
        self.history.commit_gesture();
        output
    }

    /// Abort the draft, discarding its interim element or edge.
    pub fn cancel_draft(&mut self) {
        self.snap.reset();
        if let Some(draft) = self.draft.take() {
            if let Some(id) = draft.element {
                self.store.purge_element(id);
            }
            if let Some(edge_id) = draft.edge {
                self.store.purge_edge(edge_id);
            }
        }
        self.history.cancel_gesture(&mut self.store);
    }

    // ── Erasure ─────────────────────────────────────────────────

    /// Delete every erasable stroke touched by an eraser circle swept along
    /// `path`. The whole sweep is one undoable step; returns the number of
    /// elements deleted.
    pub fn erase_along_path(&mut self, path: &[Point], radius: f64) -> usize {
        self.ensure_index();
        let hits = erase::hits_along(&self.store, &self.index, path, radius);
        if hits.is_empty() {
            return 0;
        }
        self.history.begin_gesture("erase");
        let mut erased = 0;
        for id in hits {
            if self.store.get(id).is_some() {
                self.remove_recorded(id);
                self.selection.remove(&id);
                erased += 1;
            }
        }
        self.history.commit_gesture();
        erased
    }

    // ── History API ─────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ── Selection and viewport ──────────────────────────────────

    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.selection = ids.into_iter().collect();
    }

    #[must_use]
    pub fn selection(&self) -> &HashSet<ElementId> {
        &self.selection
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Capture the full scene for the persistence collaborator.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::of(&self.store)
    }

    /// Replace the scene with a snapshot. History, selection, and any
    /// in-flight draft are dropped; the index rebuilds before the next
    /// query.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) {
        snapshot.apply(&mut self.store);
        self.history.clear();
        self.snap.reset();
        self.selection.clear();
        self.draft = None;
    }
}

impl Default for SceneEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn draft_label(tool: DraftTool) -> &'static str {
    match tool {
        DraftTool::Rectangle => "draw rectangle",
        DraftTool::Ellipse => "draw ellipse",
        DraftTool::Sticky => "draw sticky",
        DraftTool::Text => "draw text",
        DraftTool::Section => "draw section",
        DraftTool::Stroke => "draw stroke",
        DraftTool::Connector(_) => "draw connector",
    }
}

/// Minimal interim element for a shape or stroke draft at its start point.
fn draft_seed(tool: DraftTool, point: Point) -> Element {
    let kind = match tool {
        DraftTool::Ellipse => {
            ElementKind::Ellipse { radius_x: MIN_SIZE, radius_y: MIN_SIZE }
        }
        DraftTool::Sticky => ElementKind::Sticky {
            text: String::new(),
            width: MIN_SIZE,
            height: MIN_SIZE,
        },
        DraftTool::Text => ElementKind::Text {
            content: String::new(),
            width: MIN_SIZE,
            height: MIN_SIZE,
        },
        DraftTool::Section => ElementKind::Section { width: MIN_SIZE, height: MIN_SIZE },
        DraftTool::Stroke => ElementKind::Stroke {
            points: vec![Point::new(0.0, 0.0)],
            stroke_width: 2.0,
        },
        DraftTool::Rectangle | DraftTool::Connector(_) => {
            ElementKind::Rectangle { width: MIN_SIZE, height: MIN_SIZE }
        }
    };
    Element::new(point.x, point.y, kind)
}

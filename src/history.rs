//! Undo/redo history over committed gestures.
//!
//! A gesture is the unit of undo. Interim updates during a drag never touch
//! history; only the gesture-final mutation is recorded, as a single entry
//! holding the full before/after states of everything it changed. Undo and
//! redo replay those states verbatim through the store's replay paths, so a
//! round trip is byte-for-byte and never re-triggers clamping, timestamps,
//! or the edge-detach policy.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_CAPACITY;
use crate::element::{Edge, Element};
use crate::store::ElementStore;

/// Where the gesture state machine currently sits. Interim mutations are
/// only legal while `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Active,
}

/// One recorded mutation, carrying full states rather than deltas.
#[derive(Debug, Clone)]
pub enum HistoryOp {
    AddElement(Element),
    RemoveElement(Element),
    UpdateElement { before: Element, after: Element },
    AddEdge(Edge),
    RemoveEdge(Edge),
    UpdateEdge { before: Edge, after: Edge },
}

impl HistoryOp {
    /// Caption for a single-op entry, e.g. an undo menu item.
    fn label(&self) -> &'static str {
        match self {
            Self::AddElement(_) => "add element",
            Self::RemoveElement(_) => "remove element",
            Self::UpdateElement { .. } => "update element",
            Self::AddEdge(_) => "add edge",
            Self::RemoveEdge(_) => "remove edge",
            Self::UpdateEdge { .. } => "update edge",
        }
    }

    fn apply(&self, store: &mut ElementStore) {
        match self {
            Self::AddElement(el) => store.restore_element(el.clone()),
            Self::RemoveElement(el) => {
                store.purge_element(el.id);
            }
            Self::UpdateElement { after, .. } => store.restore_element(after.clone()),
            Self::AddEdge(edge) => store.restore_edge(edge.clone()),
            Self::RemoveEdge(edge) => {
                store.purge_edge(edge.id);
            }
            Self::UpdateEdge { after, .. } => store.restore_edge(after.clone()),
        }
    }

    fn revert(&self, store: &mut ElementStore) {
        match self {
            Self::AddElement(el) => {
                store.purge_element(el.id);
            }
            Self::RemoveElement(el) => store.restore_element(el.clone()),
            Self::UpdateElement { before, .. } => store.restore_element(before.clone()),
            Self::AddEdge(edge) => {
                store.purge_edge(edge.id);
            }
            Self::RemoveEdge(edge) => store.restore_edge(edge.clone()),
            Self::UpdateEdge { before, .. } => store.restore_edge(before.clone()),
        }
    }
}

/// One undoable step: everything a single gesture changed.
#[derive(Debug, Clone)]
struct HistoryEntry {
    label: &'static str,
    ops: Vec<HistoryOp>,
}

/// Bounded undo/redo stacks plus the gesture state machine.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    capacity: usize,
    phase: GesturePhase,
    pending: Vec<HistoryOp>,
    pending_label: &'static str,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
            phase: GesturePhase::Idle,
            pending: Vec::new(),
            pending_label: "",
        }
    }

    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Open a gesture. Ops recorded until commit or cancel become one
    /// entry, captioned with `label`.
    pub fn begin_gesture(&mut self, label: &'static str) {
        if self.phase == GesturePhase::Active {
            tracing::warn!(label, "gesture already active; ops will join the open gesture");
            return;
        }
        self.phase = GesturePhase::Active;
        self.pending.clear();
        self.pending_label = label;
    }

    /// Record a mutation that the caller has already applied to the store.
    ///
    /// Outside a gesture the op commits immediately as its own entry.
    pub fn record(&mut self, op: HistoryOp) {
        if self.phase == GesturePhase::Active {
            self.pending.push(op);
        } else {
            let label = op.label();
            self.push_entry(HistoryEntry { label, ops: vec![op] });
        }
    }

    /// Close the gesture, committing its ops as one undoable entry.
    /// A gesture that recorded nothing leaves history untouched.
    pub fn commit_gesture(&mut self) {
        self.phase = GesturePhase::Idle;
        if self.pending.is_empty() {
            return;
        }
        let ops = std::mem::take(&mut self.pending);
        self.push_entry(HistoryEntry { label: self.pending_label, ops });
    }

    /// Abort the gesture, rolling its ops back out of the store in reverse
    /// order. Nothing reaches the undo stack.
    pub fn cancel_gesture(&mut self, store: &mut ElementStore) {
        self.phase = GesturePhase::Idle;
        for op in self.pending.drain(..).rev() {
            op.revert(store);
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        if self.undo_stack.len() == self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(entry);
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Caption of the entry the next `undo` would revert.
    #[must_use]
    pub fn undo_label(&self) -> Option<&'static str> {
        self.undo_stack.back().map(|e| e.label)
    }

    /// Caption of the entry the next `redo` would reapply.
    #[must_use]
    pub fn redo_label(&self) -> Option<&'static str> {
        self.redo_stack.last().map(|e| e.label)
    }

    /// Revert the most recent entry. Returns false with no effect when
    /// there is nothing to undo or a gesture is still open.
    pub fn undo(&mut self, store: &mut ElementStore) -> bool {
        if self.phase == GesturePhase::Active {
            tracing::warn!("undo ignored during an active gesture");
            return false;
        }
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        for op in entry.ops.iter().rev() {
            op.revert(store);
        }
        self.redo_stack.push(entry);
        true
    }

    /// Reapply the most recently undone entry.
    pub fn redo(&mut self, store: &mut ElementStore) -> bool {
        if self.phase == GesturePhase::Active {
            tracing::warn!("redo ignored during an active gesture");
            return false;
        }
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        for op in &entry.ops {
            op.apply(store);
        }
        self.undo_stack.push_back(entry);
        true
    }

    /// Drop all history, e.g. after hydrating a snapshot.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending.clear();
        self.phase = GesturePhase::Idle;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

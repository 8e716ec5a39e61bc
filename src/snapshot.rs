//! Whole-store snapshots for the persistence collaborator.
//!
//! A snapshot is the full element and edge set in a stable order, ready for
//! JSON round-tripping. The engine does not own file formats beyond this;
//! hydration goes back through [`ElementStore::load`].

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::{Edge, Element};
use crate::store::ElementStore;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot json: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serializable image of a store: every element and edge, sorted by id so
/// equal stores produce byte-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub elements: Vec<Element>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    /// Capture the current store contents.
    #[must_use]
    pub fn of(store: &ElementStore) -> Self {
        let mut elements: Vec<Element> = store.elements().cloned().collect();
        elements.sort_by_key(|el| el.id);
        let mut edges: Vec<Edge> = store.edges().cloned().collect();
        edges.sort_by_key(|e| e.id);
        Self { elements, edges }
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a JSON document produced by [`Snapshot::to_json`].
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hydrate a store with this snapshot's contents, replacing whatever it
    /// held. The store comes back spatially dirty.
    pub fn apply(self, store: &mut ElementStore) {
        store.load(self.elements, self.edges);
    }
}

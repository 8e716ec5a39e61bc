//! Interaction engine for a 2D whiteboard scene.
//!
//! This crate owns the data and interaction semantics of a whiteboard
//! surface: which elements exist, where they are, how they connect, and how
//! gestures mutate them. It renders nothing and talks to no network. The
//! host presentation layer feeds it pointer positions in world coordinates
//! and asks [`engine::SceneEngine`] which elements are visible each render
//! tick; a persistence collaborator round-trips the scene through
//! [`snapshot::Snapshot`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Facade tying store, index, history, and gestures together |
//! | [`store`] | Element/edge store and dirty-state bookkeeping |
//! | [`element`] | Element and edge data model |
//! | [`geom`] | Points, rectangles, and polyline helpers |
//! | [`spatial`] | Quadtree index over element bounds |
//! | [`viewport`] | Viewport culling and level-of-detail buckets |
//! | [`port`] | Attachment-port resolution on element boundaries |
//! | [`snap`] | Grid/anchor snapping with hysteresis |
//! | [`route`] | Connector routing and dirty-edge reflow |
//! | [`erase`] | Radius erasure over strokes |
//! | [`transform`] | Folding interactive transforms into geometry |
//! | [`history`] | Gesture-scoped undo/redo |
//! | [`snapshot`] | Whole-store serialization |
//! | [`consts`] | Shared numeric constants (thresholds, budgets, sizes) |

pub mod consts;
pub mod element;
pub mod engine;
pub mod erase;
pub mod geom;
pub mod history;
pub mod port;
pub mod route;
pub mod snap;
pub mod snapshot;
pub mod spatial;
pub mod store;
pub mod transform;
pub mod viewport;

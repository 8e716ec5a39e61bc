//! Shared numeric constants for the scene engine.

// ── Geometry ────────────────────────────────────────────────────

/// Minimum element size in world units. Patches below this are clamped.
pub const MIN_SIZE: f64 = 1.0;

// ── Culling ─────────────────────────────────────────────────────

/// Screen-space buffer in pixels added around the viewport before culling,
/// so elements do not pop in at the edges during pans.
pub const CULL_BUFFER_PX: f64 = 100.0;

/// Zoom at or above which elements render at full detail.
pub const LOD_FULL_ZOOM: f64 = 1.5;

/// Zoom at or above which elements render simplified.
pub const LOD_SIMPLIFIED_ZOOM: f64 = 0.5;

/// Zoom at or above which elements render as placeholders.
pub const LOD_PLACEHOLDER_ZOOM: f64 = 0.1;

// ── Snapping ────────────────────────────────────────────────────

/// Snap capture threshold in screen pixels. Divided by zoom, so it stays a
/// constant number of pixels on screen.
pub const SNAP_THRESHOLD_PX: f64 = 10.0;

/// Secondary capture radius as a fraction of the threshold. A held target
/// keeps winning while the cursor stays inside this radius.
pub const SNAP_HYSTERESIS_RATIO: f64 = 0.6;

/// Default grid cell size in world units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Strength weight for element anchor candidates.
pub const ANCHOR_STRENGTH: f64 = 1.5;

/// Strength weight for alignment guide candidates.
pub const GUIDE_STRENGTH: f64 = 1.2;

/// Strength weight for grid corner candidates.
pub const GRID_STRENGTH: f64 = 1.0;

// ── Routing ─────────────────────────────────────────────────────

/// Outward stub length from a port before an orthogonal path may turn.
pub const PORT_CLEARANCE: f64 = 8.0;

/// Segments shorter than this are collapsed out of routed polylines.
pub const MIN_SEGMENT: f64 = 0.5;

/// Number of line segments a curved connector is flattened into.
pub const CURVE_SEGMENTS: usize = 16;

/// Maximum nodes the obstacle-aware search may pop before falling back to
/// the unobstructed orthogonal route.
pub const ASTAR_NODE_BUDGET: usize = 2048;

/// Extra cost charged per bend in the obstacle-aware search, in world units.
pub const BEND_PENALTY: f64 = 10.0;

/// Maximum distance at which a connector draft attaches to a port.
pub const PORT_ATTACH_DIST: f64 = 12.0;

// ── History ─────────────────────────────────────────────────────

/// Maximum retained undo entries. Oldest entries drop past this bound.
pub const HISTORY_CAPACITY: usize = 100;

//! Connector routing and dirty-edge reflow.
//!
//! Port resolution is pure; routing turns a pair of resolved endpoints into
//! a flattened polyline per the edge's mode. Orthogonal routes prefer the
//! fewest bends, then the shortest length, and step around obstacles with a
//! bounded A* search over a grid cut from obstacle bounds. When the search
//! finds nothing within its node budget it degrades to the unobstructed
//! orthogonal result rather than failing.
//!
//! Reflow recomputes exactly the edges in the store's dirty set. An edge
//! whose endpoint element no longer exists keeps its last cached path and
//! is skipped with a diagnostic — dangling references are soft failures.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::consts::{ASTAR_NODE_BUDGET, BEND_PENALTY, CURVE_SEGMENTS, MIN_SEGMENT, PORT_CLEARANCE};
use crate::element::{Edge, EdgeEndpoint, ElementId, ElementKind, PortKind, RouteMode};
use crate::geom::{bend_count, polyline_length, Point, Rect};
use crate::port;
use crate::store::ElementStore;

/// Cost multiplier so the A* heap can order on integer keys.
const ASTAR_COST_SCALE: f64 = 1000.0;

/// Padding shrink applied when testing moves against obstacles, so travel
/// along an obstacle's expanded boundary is not itself blocked.
const OBSTACLE_EPS: f64 = 1e-6;

/// A resolved edge endpoint: world position, outward normal, and the
/// element it is attached to (if any).
#[derive(Debug, Clone, Copy)]
struct ResolvedEnd {
    point: Point,
    normal: (f64, f64),
    element: Option<ElementId>,
}

fn resolve(store: &ElementStore, endpoint: &EdgeEndpoint) -> Option<ResolvedEnd> {
    match endpoint {
        EdgeEndpoint::Port(port_ref) => {
            let point = port::world_port(store, port_ref.element, port_ref.port)?;
            Some(ResolvedEnd {
                point,
                normal: port_ref.port.outward_normal(),
                element: Some(port_ref.element),
            })
        }
        EdgeEndpoint::Free(p) => Some(ResolvedEnd { point: *p, normal: (0.0, 0.0), element: None }),
    }
}

/// Compute the path for an edge against the current store state.
///
/// Returns `None` when an attached endpoint cannot be resolved (missing
/// element, or a kind without ports); the caller decides what to do with
/// the stale cache.
#[must_use]
pub fn route(store: &ElementStore, edge: &Edge) -> Option<Vec<Point>> {
    let a = resolve(store, &edge.source)?;
    let b = resolve(store, &edge.target)?;
    let points = match edge.mode {
        RouteMode::Straight => vec![a.point, b.point],
        RouteMode::Curved => route_curved(a.point, b.point),
        RouteMode::Orthogonal => {
            let base = route_orthogonal(a, b);
            let obstacles = obstacles_on_path(store, &base, a.element, b.element);
            if obstacles.is_empty() {
                base
            } else {
                route_around(a, b, &obstacles).unwrap_or(base)
            }
        }
    };
    Some(points)
}

/// Recompute exactly the dirty edges, storing fresh paths and clearing the
/// set. Returns the number of edges rerouted.
pub fn reflow(store: &mut ElementStore) -> usize {
    let dirty = store.take_dirty_edges();
    let mut rerouted = 0;
    for id in dirty {
        let Some(edge) = store.edge(id) else {
            continue;
        };
        let edge = edge.clone();
        match route(store, &edge) {
            Some(points) => {
                store.set_edge_points(id, points);
                rerouted += 1;
            }
            None => {
                tracing::warn!(edge = %id, "edge endpoint missing; keeping stale cached path");
            }
        }
    }
    rerouted
}

// ── Straight / curved ───────────────────────────────────────────

fn route_curved(a: Point, b: Point) -> Vec<Point> {
    let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    // Bias the control point along the dominant travel axis: the arc
    // leaves the source flat and curves into the target.
    let ctrl = if dx.abs() >= dy.abs() {
        Point::new(mid.x, a.y)
    } else {
        Point::new(a.x, mid.y)
    };
    let mut points = Vec::with_capacity(CURVE_SEGMENTS + 1);
    for i in 0..=CURVE_SEGMENTS {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f64 / CURVE_SEGMENTS as f64;
        let u = 1.0 - t;
        points.push(Point::new(
            u * u * a.x + 2.0 * u * t * ctrl.x + t * t * b.x,
            u * u * a.y + 2.0 * u * t * ctrl.y + t * t * b.y,
        ));
    }
    points
}

// ── Orthogonal ──────────────────────────────────────────────────

/// Normal actually used for routing: free endpoints (and center ports)
/// adopt the dominant axis toward the far point.
fn effective_normal(end: ResolvedEnd, toward: Point) -> (f64, f64) {
    if end.normal != (0.0, 0.0) {
        return end.normal;
    }
    let dx = toward.x - end.point.x;
    let dy = toward.y - end.point.y;
    if dx.abs() >= dy.abs() {
        (dx.signum(), 0.0)
    } else {
        (0.0, dy.signum())
    }
}

fn route_orthogonal(a: ResolvedEnd, b: ResolvedEnd) -> Vec<Point> {
    let na = effective_normal(a, b.point);
    let nb = effective_normal(b, a.point);
    let pa = a.point;
    let pb = b.point;
    let a2 = pa.offset(na.0 * PORT_CLEARANCE, na.1 * PORT_CLEARANCE);
    let b2 = pb.offset(nb.0 * PORT_CLEARANCE, nb.1 * PORT_CLEARANCE);
    let mid_x = (a2.x + b2.x) / 2.0;
    let mid_y = (a2.y + b2.y) / 2.0;

    let candidates: [Vec<Point>; 6] = [
        // Plain elbows, used when both ports face the travel direction.
        vec![pa, Point::new(pb.x, pa.y), pb],
        vec![pa, Point::new(pa.x, pb.y), pb],
        // Stubbed elbows.
        vec![pa, a2, Point::new(b2.x, a2.y), b2, pb],
        vec![pa, a2, Point::new(a2.x, b2.y), b2, pb],
        // Mid-channel routes for opposing or misaligned ports.
        vec![pa, a2, Point::new(a2.x, mid_y), Point::new(b2.x, mid_y), b2, pb],
        vec![pa, a2, Point::new(mid_x, a2.y), Point::new(mid_x, b2.y), b2, pb],
    ];

    let mut best: Option<(usize, f64, Vec<Point>)> = None;
    let mut fallback: Option<(usize, f64, Vec<Point>)> = None;
    for candidate in candidates {
        let path = collapse(&candidate);
        if path.len() < 2 {
            continue;
        }
        let bends = bend_count(&path);
        let length = polyline_length(&path);
        let valid = respects_normals(&path, na, nb) && !has_backtrack(&path);
        let slot = if valid { &mut best } else { &mut fallback };
        let better = slot
            .as_ref()
            .map_or(true, |(bb, bl, _)| bends < *bb || (bends == *bb && length < *bl));
        if better {
            *slot = Some((bends, length, path));
        }
    }
    match best.or(fallback) {
        Some((_, _, path)) => path,
        None => vec![pa, pb],
    }
}

/// A path is port-respecting when its first segment does not travel against
/// the source normal and its last segment does not arrive along the target
/// normal (which would approach from inside the element).
fn respects_normals(path: &[Point], na: (f64, f64), nb: (f64, f64)) -> bool {
    if path.len() < 2 {
        return false;
    }
    let first = direction(path[0], path[1]);
    let last = direction(path[path.len() - 2], path[path.len() - 1]);
    let out_ok = na == (0.0, 0.0) || first.0 * na.0 + first.1 * na.1 >= 0.0;
    let in_ok = nb == (0.0, 0.0) || last.0 * nb.0 + last.1 * nb.1 <= 0.0;
    out_ok && in_ok
}

fn has_backtrack(path: &[Point]) -> bool {
    path.windows(3).any(|w| {
        let d1 = direction(w[0], w[1]);
        let d2 = direction(w[1], w[2]);
        d1.0 * d2.0 + d1.1 * d2.1 < -0.5
    })
}

fn direction(from: Point, to: Point) -> (f64, f64) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        (0.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

/// Drop zero/short segments and merge collinear same-direction runs.
fn collapse(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if let Some(&last) = out.last() {
            if last.dist(p) < MIN_SEGMENT {
                continue;
            }
        }
        out.push(p);
    }
    let mut merged: Vec<Point> = Vec::with_capacity(out.len());
    for &p in &out {
        while merged.len() >= 2 {
            let a = merged[merged.len() - 2];
            let b = merged[merged.len() - 1];
            let d1 = direction(a, b);
            let d2 = direction(b, p);
            if (d1.0 - d2.0).abs() < 1e-9 && (d1.1 - d2.1).abs() < 1e-9 {
                merged.pop();
            } else {
                break;
            }
        }
        merged.push(p);
    }
    merged
}

// ── Obstacle-aware orthogonal ───────────────────────────────────

/// Bounds of solid elements that the given path actually crosses.
/// Sections (containers) and strokes are never obstacles, nor are the
/// elements the edge is attached to.
fn obstacles_on_path(
    store: &ElementStore,
    path: &[Point],
    skip_a: Option<ElementId>,
    skip_b: Option<ElementId>,
) -> Vec<Rect> {
    let mut obstacles = Vec::new();
    for el in store.elements() {
        if Some(el.id) == skip_a || Some(el.id) == skip_b || el.hidden {
            continue;
        }
        if matches!(el.kind, ElementKind::Section { .. } | ElementKind::Stroke { .. }) {
            continue;
        }
        let Some(bounds) = store.world_bounds(el.id) else {
            continue;
        };
        let crossed = path
            .windows(2)
            .any(|w| Rect::from_points(w[0], w[1]).intersects(&bounds));
        if crossed {
            obstacles.push(bounds);
        }
    }
    obstacles
}

/// A*-style search over a grid cut from obstacle bounds, between the
/// clearance stubs of both endpoints. Returns `None` when the search
/// exhausts its node budget or no route exists; callers fall back to the
/// unobstructed orthogonal result.
fn route_around(a: ResolvedEnd, b: ResolvedEnd, obstacles: &[Rect]) -> Option<Vec<Point>> {
    let na = effective_normal(a, b.point);
    let nb = effective_normal(b, a.point);
    let a2 = a.point.offset(na.0 * PORT_CLEARANCE, na.1 * PORT_CLEARANCE);
    let b2 = b.point.offset(nb.0 * PORT_CLEARANCE, nb.1 * PORT_CLEARANCE);

    let padded: Vec<Rect> = obstacles.iter().map(|r| r.expand(PORT_CLEARANCE)).collect();
    let mut xs = vec![a2.x, b2.x];
    let mut ys = vec![a2.y, b2.y];
    for r in &padded {
        xs.push(r.x);
        xs.push(r.max_x());
        ys.push(r.y);
        ys.push(r.max_y());
    }
    dedup_sorted(&mut xs);
    dedup_sorted(&mut ys);

    let start = grid_pos(&xs, &ys, a2)?;
    let goal = grid_pos(&xs, &ys, b2)?;

    // Keyed by (xi, yi, incoming axis: 0 none, 1 horizontal, 2 vertical).
    let mut best_cost: HashMap<(usize, usize, u8), f64> = HashMap::new();
    let mut came_from: HashMap<(usize, usize, u8), (usize, usize, u8)> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(u64, usize, usize, u8)>> = BinaryHeap::new();
    best_cost.insert((start.0, start.1, 0), 0.0);
    heap.push(Reverse((heuristic(&xs, &ys, start, goal), start.0, start.1, 0)));

    let mut popped = 0usize;
    let mut goal_state: Option<(usize, usize, u8)> = None;
    while let Some(Reverse((_, xi, yi, axis))) = heap.pop() {
        popped += 1;
        if popped > ASTAR_NODE_BUDGET {
            tracing::debug!("obstacle-aware routing exceeded node budget; falling back");
            return None;
        }
        if (xi, yi) == goal {
            goal_state = Some((xi, yi, axis));
            break;
        }
        let here = best_cost.get(&(xi, yi, axis)).copied()?;
        for (nxi, nyi, naxis) in neighbors(&xs, &ys, xi, yi) {
            let from = Point::new(xs[xi], ys[yi]);
            let to = Point::new(xs[nxi], ys[nyi]);
            if move_blocked(from, to, &padded) {
                continue;
            }
            let mut cost = here + from.dist(to);
            if axis != 0 && axis != naxis {
                cost += BEND_PENALTY;
            }
            let key = (nxi, nyi, naxis);
            if best_cost.get(&key).is_none_or(|&c| cost < c) {
                best_cost.insert(key, cost);
                came_from.insert(key, (xi, yi, axis));
                let f = scale_cost(cost) + heuristic(&xs, &ys, (nxi, nyi), goal);
                heap.push(Reverse((f, nxi, nyi, naxis)));
            }
        }
    }

    let mut state = goal_state?;
    let mut rev = vec![Point::new(xs[state.0], ys[state.1])];
    while let Some(&prev) = came_from.get(&state) {
        rev.push(Point::new(xs[prev.0], ys[prev.1]));
        state = prev;
    }
    rev.reverse();

    let mut full = Vec::with_capacity(rev.len() + 2);
    full.push(a.point);
    full.extend(rev);
    full.push(b.point);
    Some(collapse(&full))
}

fn dedup_sorted(values: &mut Vec<f64>) {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
}

fn grid_pos(xs: &[f64], ys: &[f64], p: Point) -> Option<(usize, usize)> {
    let xi = xs.iter().position(|&x| (x - p.x).abs() < 1e-9)?;
    let yi = ys.iter().position(|&y| (y - p.y).abs() < 1e-9)?;
    Some((xi, yi))
}

fn neighbors(xs: &[f64], ys: &[f64], xi: usize, yi: usize) -> Vec<(usize, usize, u8)> {
    let mut out = Vec::with_capacity(4);
    if xi > 0 {
        out.push((xi - 1, yi, 1));
    }
    if xi + 1 < xs.len() {
        out.push((xi + 1, yi, 1));
    }
    if yi > 0 {
        out.push((xi, yi - 1, 2));
    }
    if yi + 1 < ys.len() {
        out.push((xi, yi + 1, 2));
    }
    out
}

fn move_blocked(from: Point, to: Point, padded: &[Rect]) -> bool {
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    padded
        .iter()
        .any(|r| r.expand(-OBSTACLE_EPS).contains_point(mid))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_cost(cost: f64) -> u64 {
    (cost.max(0.0) * ASTAR_COST_SCALE) as u64
}

fn heuristic(xs: &[f64], ys: &[f64], from: (usize, usize), goal: (usize, usize)) -> u64 {
    let d = (xs[from.0] - xs[goal.0]).abs() + (ys[from.1] - ys[goal.1]).abs();
    scale_cost(d)
}

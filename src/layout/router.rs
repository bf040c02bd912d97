//! Edge routing: orthogonal waypoints with an A* escape hatch.
//!
//! The default mode threads each edge through the mid-row of every layer
//! gap, following its dummy chain. When that polyline would cut through a
//! node box, the edge is re-routed with A* over the character grid, which
//! treats boxes as obstacles, charges 2 for a 90° turn, and charges 3 for
//! stepping onto a cell another edge already uses. If A* cannot reach the
//! goal the orthogonal polyline is kept as-is.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use super::types::{LayoutNode, Point, RoutedEdge};
use crate::syntax::types::EdgeType;

// ─── Route plans ─────────────────────────────────────────────────────────────

/// One original edge, identified through its dummy chain.
/// Endpoints are in layered orientation; `flipped` remembers that cycle
/// removal turned the edge around and the stored polyline must be reversed
/// before it reaches the renderer.
#[derive(Debug, Clone)]
pub(crate) struct RoutePlan {
    pub from: String,
    pub to: String,
    pub edge_type: EdgeType,
    pub label: Option<String>,
    pub flipped: bool,
    pub self_loop: bool,
    /// Dummy node ids between `from` and `to`, one per intermediate layer.
    pub chain: Vec<String>,
}

// ─── Occupancy grid ──────────────────────────────────────────────────────────

/// Boolean obstacle grid over the scope's character cells.
pub struct OccupancyGrid {
    pub width: i64,
    pub height: i64,
    blocked: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(width: i64, height: i64) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            blocked: vec![false; cells],
        }
    }

    pub fn block_rect(&mut self, x: i64, y: i64, w: i64, h: i64) {
        for row in y.max(0)..(y + h).min(self.height) {
            for col in x.max(0)..(x + w).min(self.width) {
                self.blocked[(row * self.width + col) as usize] = true;
            }
        }
    }

    pub fn is_free(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        !self.blocked[(y * self.width + x) as usize]
    }
}

// ─── A* ──────────────────────────────────────────────────────────────────────

const DIRS: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const NO_DIR: usize = 4;

const STEP_COST: i64 = 1;
const TURN_COST: i64 = 2;
const CROSSING_COST: i64 = 3;

fn manhattan(ax: i64, ay: i64, bx: i64, by: i64) -> i64 {
    (ax - bx).abs() + (ay - by).abs()
}

/// Shortest path from `start` to `goal`, both of which may sit on blocked
/// border cells. Ties prefer continuing straight, then lower y, then lower x,
/// so the result is identical across runs.
pub fn a_star(
    grid: &OccupancyGrid,
    occupied: &HashSet<(i64, i64)>,
    start: Point,
    goal: Point,
) -> Option<Vec<Point>> {
    type HeapItem = Reverse<(i64, u8, i64, i64, usize, u64)>;
    let mut open: BinaryHeap<HeapItem> = BinaryHeap::new();
    let mut best: HashMap<(i64, i64, usize), i64> = HashMap::new();
    let mut came_from: HashMap<(i64, i64, usize), (i64, i64, usize)> = HashMap::new();
    let mut seq: u64 = 0;

    best.insert((start.x, start.y, NO_DIR), 0);
    open.push(Reverse((
        manhattan(start.x, start.y, goal.x, goal.y),
        0,
        start.y,
        start.x,
        NO_DIR,
        seq,
    )));

    while let Some(Reverse((_, _, cy, cx, cdir, _))) = open.pop() {
        if cx == goal.x && cy == goal.y {
            let mut path = Vec::new();
            let mut cur = (cx, cy, cdir);
            loop {
                path.push(Point::new(cur.0, cur.1));
                match came_from.get(&cur) {
                    Some(&prev) => cur = prev,
                    None => break,
                }
            }
            path.reverse();
            return Some(simplify_path(path));
        }

        let g = best[&(cx, cy, cdir)];

        for (d, (dx, dy)) in DIRS.iter().enumerate() {
            let nx = cx + dx;
            let ny = cy + dy;
            let at_goal = nx == goal.x && ny == goal.y;
            if !at_goal && !grid.is_free(nx, ny) {
                continue;
            }

            let turned = cdir != NO_DIR && cdir != d;
            let mut cost = g + STEP_COST;
            if turned {
                cost += TURN_COST;
            }
            if occupied.contains(&(nx, ny)) {
                cost += CROSSING_COST;
            }

            let key = (nx, ny, d);
            if best.get(&key).map_or(true, |&prev| cost < prev) {
                best.insert(key, cost);
                came_from.insert(key, (cx, cy, cdir));
                seq += 1;
                open.push(Reverse((
                    cost + manhattan(nx, ny, goal.x, goal.y),
                    turned as u8,
                    ny,
                    nx,
                    d,
                    seq,
                )));
            }
        }
    }

    None
}

/// Drop collinear interior points, keeping only direction changes.
pub fn simplify_path(path: Vec<Point>) -> Vec<Point> {
    if path.len() <= 2 {
        return path;
    }
    let mut out = vec![path[0]];
    for i in 1..path.len() - 1 {
        let a = path[i - 1];
        let b = path[i];
        let c = path[i + 1];
        if (b.x - a.x, b.y - a.y) != (c.x - b.x, c.y - b.y) {
            out.push(b);
        }
    }
    out.push(*path.last().unwrap());
    out
}

// ─── Scope routing ───────────────────────────────────────────────────────────

pub(crate) struct RouteContext<'a> {
    /// All placed nodes of the scope, dummies included (layout space).
    pub nodes: &'a [LayoutNode],
    /// Topmost y per layer.
    pub layer_top: &'a [i64],
    /// One-past-bottom y per layer.
    pub layer_bottom: &'a [i64],
}

/// Route every plan of a scope. Duplicate (source, target, chain) plans are
/// rendered once, first occurrence wins.
pub(crate) fn route_scope(plans: &[RoutePlan], ctx: &RouteContext<'_>) -> Vec<RoutedEdge> {
    let node_map: IndexMap<&str, &LayoutNode> =
        ctx.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let dummy_center = |id: &str| node_map.get(id).map(|n| n.center_x());

    // Dedup on declared endpoints + chain, before slot assignment, so a
    // dropped duplicate frees its slot.
    let mut seen: IndexSet<(String, String, Vec<i64>)> = IndexSet::new();
    let mut kept: Vec<&RoutePlan> = Vec::new();
    for plan in plans {
        let chain_xs: Vec<i64> = plan.chain.iter().filter_map(|d| dummy_center(d)).collect();
        let key = if plan.flipped {
            (plan.to.clone(), plan.from.clone(), chain_xs)
        } else {
            (plan.from.clone(), plan.to.clone(), chain_xs)
        };
        if seen.insert(key) {
            kept.push(plan);
        } else {
            debug!("dropping duplicate edge {} -> {}", plan.from, plan.to);
        }
    }

    let exit_x = attach_columns(&kept, &node_map, true);
    let entry_x = attach_columns(&kept, &node_map, false);

    let grid = build_grid(ctx.nodes);
    let mut occupied: HashSet<(i64, i64)> = HashSet::new();
    let mut routed = Vec::new();

    for (i, plan) in kept.iter().enumerate() {
        let Some(&from) = node_map.get(plan.from.as_str()) else {
            continue;
        };
        let Some(&to) = node_map.get(plan.to.as_str()) else {
            continue;
        };

        let mut waypoints = if plan.self_loop {
            loop_waypoints(from)
        } else {
            let chain_xs: Vec<i64> = plan.chain.iter().filter_map(|d| dummy_center(d)).collect();
            let ortho = orthogonal_waypoints(from, to, exit_x[i], entry_x[i], &chain_xs, ctx);
            if crosses_a_box(&ortho, ctx.nodes, from, to) {
                trace!("edge {} -> {} blocked, escalating to A*", plan.from, plan.to);
                match a_star(
                    &grid,
                    &occupied,
                    Point::new(exit_x[i], from.bottom() - 1),
                    Point::new(entry_x[i], to.y),
                ) {
                    Some(path) => path,
                    // RoutingFallback: keep the orthogonal polyline.
                    None => ortho,
                }
            } else {
                ortho
            }
        };

        for cell in interior_cells(&waypoints) {
            occupied.insert((cell.x, cell.y));
        }

        if plan.flipped {
            waypoints.reverse();
        }
        let (from_id, to_id) = if plan.flipped {
            (plan.to.clone(), plan.from.clone())
        } else {
            (plan.from.clone(), plan.to.clone())
        };

        routed.push(RoutedEdge {
            from_id,
            to_id,
            label: plan.label.clone(),
            edge_type: plan.edge_type,
            waypoints,
        });
    }

    routed
}

/// Spread the attach columns of all polylines that share a border side,
/// ordered by the opposite endpoint's position, then declaration order.
fn attach_columns(
    kept: &[&RoutePlan],
    node_map: &IndexMap<&str, &LayoutNode>,
    exits: bool,
) -> Vec<i64> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (i, plan) in kept.iter().enumerate() {
        if plan.self_loop {
            continue;
        }
        let anchor = if exits { &plan.from } else { &plan.to };
        groups.entry(anchor.clone()).or_default().push(i);
    }

    let mut columns = vec![0i64; kept.len()];
    for (anchor, mut members) in groups {
        let Some(&node) = node_map.get(anchor.as_str()) else {
            continue;
        };
        members.sort_by_key(|&i| {
            let other = if exits { &kept[i].to } else { &kept[i].from };
            let other_x = node_map.get(other.as_str()).map_or(0, |n| n.center_x());
            (other_x, i)
        });
        let k = members.len() as i64;
        for (slot, &i) in members.iter().enumerate() {
            let hi = (node.width - 2).max(1);
            let offset = ((slot as i64 + 1) * node.width / (k + 1)).clamp(1, hi);
            columns[i] = node.x + offset;
        }
    }
    columns
}

fn build_grid(nodes: &[LayoutNode]) -> OccupancyGrid {
    let mut w = 0;
    let mut h = 0;
    for n in nodes {
        w = w.max(n.right());
        h = h.max(n.bottom());
    }
    let mut grid = OccupancyGrid::new(w + 3, h + 3);
    for n in nodes {
        if !n.is_dummy() {
            grid.block_rect(n.x, n.y, n.width, n.height);
        }
    }
    grid
}

/// Mid row of the gap below `layer`.
fn gap_mid(layer: usize, ctx: &RouteContext<'_>) -> i64 {
    let bottom = ctx.layer_bottom.get(layer).copied().unwrap_or(0);
    let top = ctx
        .layer_top
        .get(layer + 1)
        .copied()
        .unwrap_or(bottom + super::sugiyama::LAYER_GAP);
    bottom + (top - bottom).max(0) / 2
}

/// Thread the edge down through each layer gap, shifting columns at gap
/// mid-rows to follow the dummy chain.
fn orthogonal_waypoints(
    from: &LayoutNode,
    to: &LayoutNode,
    exit_x: i64,
    entry_x: i64,
    chain_xs: &[i64],
    ctx: &RouteContext<'_>,
) -> Vec<Point> {
    assert!(
        to.layer > from.layer,
        "edge {} -> {} does not descend a layer",
        from.id,
        to.id
    );
    let span = to.layer - from.layer;
    if span > 1 {
        assert_eq!(
            chain_xs.len(),
            span - 1,
            "edge {} -> {} skips a layer after dummy insertion",
            from.id,
            to.id
        );
    }

    let mut wps = vec![Point::new(exit_x, from.bottom() - 1)];
    let mut cur_x = exit_x;
    for i in 0..span {
        let target_x = if i + 1 < span { chain_xs[i] } else { entry_x };
        if target_x != cur_x {
            let mid = gap_mid(from.layer + i, ctx);
            wps.push(Point::new(cur_x, mid));
            wps.push(Point::new(target_x, mid));
            cur_x = target_x;
        }
    }
    wps.push(Point::new(entry_x, to.y));
    simplify_path(wps)
}

/// A one-cell-wide loop hugging the right side of the box: out of the right
/// border, down past the bottom-right corner, back in through the bottom.
fn loop_waypoints(node: &LayoutNode) -> Vec<Point> {
    let side_y = node.y + 1;
    let loop_x = node.right();
    let under_y = node.bottom();
    let back_x = node.center_x();
    vec![
        Point::new(node.right() - 1, side_y),
        Point::new(loop_x, side_y),
        Point::new(loop_x, under_y),
        Point::new(back_x, under_y),
        Point::new(back_x, node.bottom() - 1),
    ]
}

/// All cells covered by the polyline, in walk order, without duplicates at
/// the seams.
pub(crate) fn polyline_cells(wps: &[Point]) -> Vec<Point> {
    let mut cells: Vec<Point> = Vec::new();
    for seg in wps.windows(2) {
        let (p, q) = (seg[0], seg[1]);
        let dx = (q.x - p.x).signum();
        let dy = (q.y - p.y).signum();
        let mut cur = p;
        loop {
            if cells.last() != Some(&cur) {
                cells.push(cur);
            }
            if cur == q {
                break;
            }
            cur = Point::new(cur.x + dx, cur.y + dy);
        }
    }
    cells
}

/// Polyline cells minus the two border attach cells.
fn interior_cells(wps: &[Point]) -> Vec<Point> {
    let cells = polyline_cells(wps);
    if cells.len() <= 2 {
        return Vec::new();
    }
    cells[1..cells.len() - 1].to_vec()
}

/// Does any interior cell of the polyline sit inside a box other than the
/// edge's own endpoints?
fn crosses_a_box(wps: &[Point], nodes: &[LayoutNode], from: &LayoutNode, to: &LayoutNode) -> bool {
    let obstacles: Vec<&LayoutNode> = nodes
        .iter()
        .filter(|n| !n.is_dummy() && n.id != from.id && n.id != to.id)
        .collect();
    interior_cells(wps).iter().any(|c| {
        obstacles
            .iter()
            .any(|n| c.x >= n.x && c.x < n.right() && c.y >= n.y && c.y < n.bottom())
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

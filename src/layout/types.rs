//! Layout output types: `Point`, `LayoutNode`, `RoutedEdge`, `LayoutResult`.
//!
//! All coordinates are integers in character-cell space; a cell is one
//! Unicode scalar value wide.

use indexmap::IndexMap;

use crate::syntax::types::{Direction, EdgeType, NodeShape};

// ─── Reserved id prefixes ────────────────────────────────────────────────────

/// Prefix for synthetic layer-bridging nodes inserted for long edges.
pub const DUMMY_PREFIX: &str = "__dummy_";
/// Prefix for synthetic compound nodes standing in for a collapsed subgraph.
pub const COMPOUND_PREFIX: &str = "__sg_";

// ─── Point ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

// ─── LayoutNode ──────────────────────────────────────────────────────────────

/// A node with its final position and box dimensions.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: String,
    pub layer: usize,
    pub order: usize,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub label: String,
    pub shape: NodeShape,
}

impl LayoutNode {
    pub fn center_x(&self) -> i64 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i64 {
        self.y + self.height / 2
    }

    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    pub fn is_dummy(&self) -> bool {
        self.id.starts_with(DUMMY_PREFIX)
    }

    pub fn is_compound(&self) -> bool {
        self.id.starts_with(COMPOUND_PREFIX)
    }
}

// ─── RoutedEdge ──────────────────────────────────────────────────────────────

/// An edge with its orthogonal polyline.
///
/// Waypoints run from the source box border to the target box border in the
/// edge's *original* orientation (cycle-removal reversals are undone before
/// the polyline is stored). Consecutive waypoints differ on exactly one axis.
#[derive(Debug, Clone)]
pub struct RoutedEdge {
    pub from_id: String,
    pub to_id: String,
    pub label: Option<String>,
    pub edge_type: EdgeType,
    pub waypoints: Vec<Point>,
}

// ─── LayoutResult ────────────────────────────────────────────────────────────

/// Everything the renderer needs, and nothing the layout still owns.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<RoutedEdge>,
    pub direction: Direction,
    /// `(subgraph_id, member node ids)` in order of declaration.
    pub subgraph_members: Vec<(String, Vec<String>)>,
    /// subgraph id → title text painted inside the border.
    pub subgraph_descriptions: IndexMap<String, String>,
}

impl LayoutResult {
    pub fn new(direction: Direction) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            direction,
            subgraph_members: Vec::new(),
            subgraph_descriptions: IndexMap::new(),
        }
    }
}

// ─── Transpose ───────────────────────────────────────────────────────────────

/// Swap x/y (and width/height) on every node and waypoint. Layout always
/// runs top-down; LR/RL are this transform away. Applying it twice is the
/// identity, which the subgraph embedding relies on.
pub fn transpose_layout(nodes: &mut [LayoutNode], edges: &mut [RoutedEdge]) {
    for n in nodes.iter_mut() {
        std::mem::swap(&mut n.x, &mut n.y);
        std::mem::swap(&mut n.width, &mut n.height);
    }
    for e in edges.iter_mut() {
        for p in e.waypoints.iter_mut() {
            std::mem::swap(&mut p.x, &mut p.y);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: i64, y: i64, w: i64, h: i64) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            layer: 0,
            order: 0,
            x,
            y,
            width: w,
            height: h,
            label: id.to_string(),
            shape: NodeShape::Rectangle,
        }
    }

    #[test]
    fn geometry_accessors() {
        let n = node("A", 2, 3, 5, 3);
        assert_eq!(n.center_x(), 4);
        assert_eq!(n.center_y(), 4);
        assert_eq!(n.right(), 7);
        assert_eq!(n.bottom(), 6);
    }

    #[test]
    fn internal_id_prefixes() {
        assert!(node("__dummy_0_1", 0, 0, 1, 3).is_dummy());
        assert!(node("__sg_G", 0, 0, 9, 9).is_compound());
        assert!(!node("dummy", 0, 0, 5, 3).is_dummy());
    }

    #[test]
    fn layout_result_starts_empty() {
        let r = LayoutResult::new(Direction::LR);
        assert!(r.nodes.is_empty());
        assert!(r.edges.is_empty());
        assert_eq!(r.direction, Direction::LR);
    }
}

//! The text renderer: seven painting phases over a character canvas.
//!
//! 1. pre-transform   — transpose the layout for LR/RL
//! 2. subgraph boxes  — rounded borders with the title on the top border
//! 3. node boxes      — shape-specific corners, centered labels
//! 4. edges           — polyline segments, Arms-merged at every cell
//! 5. arrows & labels — arrowheads one cell outside the target border
//! 6. exit stubs      — ┬/┴/├/┤ on the source border, never ┼
//! 7. post-transform  — row flip for BT, column flip for RL, with glyph
//!                      remapping

use indexmap::IndexMap;

use super::canvas::{Canvas, Rect};
use super::charset::{Arms, BoxChars, CharSet, LineFamily};
use super::Renderer;
use crate::layout::types::{transpose_layout, LayoutNode, LayoutResult, Point, RoutedEdge};
use crate::syntax::types::{Direction, EdgeType, NodeShape};

// ─── Node painting ───────────────────────────────────────────────────────────

fn box_chars_for_shape(shape: NodeShape, cs: CharSet) -> BoxChars {
    match shape {
        NodeShape::Rectangle => BoxChars::for_charset(cs),
        NodeShape::Rounded => {
            if cs == CharSet::Ascii {
                return BoxChars::ascii();
            }
            let mut bc = BoxChars::unicode();
            bc.top_left = '╭';
            bc.top_right = '╮';
            bc.bottom_left = '╰';
            bc.bottom_right = '╯';
            bc
        }
        NodeShape::Diamond => {
            let mut bc = BoxChars::for_charset(cs);
            bc.top_left = '/';
            bc.top_right = '\\';
            bc.bottom_left = '\\';
            bc.bottom_right = '/';
            bc
        }
        NodeShape::Circle => {
            let mut bc = BoxChars::for_charset(cs);
            bc.top_left = '(';
            bc.top_right = ')';
            bc.bottom_left = '(';
            bc.bottom_right = ')';
            bc.vertical = ' ';
            bc
        }
    }
}

fn paint_node(canvas: &mut Canvas, node: &LayoutNode) {
    let bc = box_chars_for_shape(node.shape, canvas.charset);
    canvas.draw_box(Rect::new(node.x, node.y, node.width, node.height), &bc);

    let inner_w = (node.width - 2).max(0);
    for (i, line) in node.label.split('\n').enumerate() {
        let row = node.y + 1 + i as i64;
        if row >= node.bottom() - 1 {
            break;
        }
        let len = line.chars().count() as i64;
        let pad = (inner_w - len).max(0) / 2;
        canvas.put_string(node.x + 1 + pad, row, line);
    }
}

fn paint_subgraph_box(canvas: &mut Canvas, node: &LayoutNode, title: &str, description: Option<&str>) {
    let bc = box_chars_for_shape(NodeShape::Rounded, canvas.charset);
    canvas.draw_box(Rect::new(node.x, node.y, node.width, node.height), &bc);

    let label = format!(" {title} ");
    if label.chars().count() as i64 + 4 <= node.width {
        canvas.put_string(node.x + 2, node.y, &label);
    }

    if let Some(desc) = description {
        let inner_w = (node.width - 2).max(0);
        let pad = (inner_w - desc.chars().count() as i64).max(0) / 2;
        canvas.put_string(node.x + 1 + pad, node.bottom() - 2, desc);
    }
}

// ─── Edge painting ───────────────────────────────────────────────────────────

fn family_for(edge_type: EdgeType) -> LineFamily {
    match edge_type {
        EdgeType::DottedArrow | EdgeType::DottedLine | EdgeType::BidirDotted => LineFamily::Dotted,
        EdgeType::ThickArrow | EdgeType::ThickLine | EdgeType::BidirThick => LineFamily::Thick,
        _ => LineFamily::Solid,
    }
}

/// Arms contributed by the polyline at every covered cell. Segment end
/// cells carry only the arm pointing into the segment, so bends merge into
/// proper corners instead of crosses.
fn edge_cell_arms(waypoints: &[Point]) -> IndexMap<(i64, i64), Arms> {
    let mut cells: IndexMap<(i64, i64), Arms> = IndexMap::new();
    let mut add = |x: i64, y: i64, arms: Arms| {
        let entry = cells.entry((x, y)).or_default();
        *entry = entry.merge(arms);
    };
    for seg in waypoints.windows(2) {
        let (p, q) = (seg[0], seg[1]);
        if p.y == q.y {
            let (lo, hi) = (p.x.min(q.x), p.x.max(q.x));
            for x in lo..=hi {
                add(x, p.y, Arms::new(false, false, x > lo, x < hi));
            }
        } else {
            let (lo, hi) = (p.y.min(q.y), p.y.max(q.y));
            for y in lo..=hi {
                add(p.x, y, Arms::new(y > lo, y < hi, false, false));
            }
        }
    }
    cells
}

/// Phase 4: paint the polyline, skipping the two border attach cells.
fn paint_edge_lines(canvas: &mut Canvas, edge: &RoutedEdge) {
    if edge.waypoints.len() < 2 {
        return;
    }
    let family = family_for(edge.edge_type);
    let first = edge.waypoints[0];
    let last = *edge.waypoints.last().unwrap();
    for ((x, y), arms) in edge_cell_arms(&edge.waypoints) {
        if (x, y) == (first.x, first.y) || (x, y) == (last.x, last.y) {
            continue;
        }
        canvas.merge_line(x, y, family, arms);
    }
}

fn unit_step(from: Point, to: Point) -> (i64, i64) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}

fn arrow_glyph(step: (i64, i64), bc: &BoxChars) -> char {
    match step {
        (0, 1) => bc.arrow_down,
        (0, -1) => bc.arrow_up,
        (1, 0) => bc.arrow_right,
        _ => bc.arrow_left,
    }
}

/// Phase 5a: arrowheads one cell outside the target border; both ends for
/// bidirectional edges.
fn paint_arrowheads(canvas: &mut Canvas, edge: &RoutedEdge) {
    if edge.waypoints.len() < 2 || !edge.edge_type.has_arrow() {
        return;
    }
    let bc = BoxChars::for_charset(canvas.charset);

    let last = *edge.waypoints.last().unwrap();
    let prev = edge.waypoints[edge.waypoints.len() - 2];
    let step = unit_step(prev, last);
    canvas.set(last.x - step.0, last.y - step.1, arrow_glyph(step, &bc));

    if edge.edge_type.is_bidirectional() {
        let first = edge.waypoints[0];
        let second = edge.waypoints[1];
        let step = unit_step(first, second);
        // Points back into the source box.
        canvas.set(
            first.x + step.0,
            first.y + step.1,
            arrow_glyph((-step.0, -step.1), &bc),
        );
    }
}

/// Phase 5b: the label sits at the midpoint waypoint, one row above the
/// segment; below it when there is no row above.
fn paint_edge_label(canvas: &mut Canvas, edge: &RoutedEdge) {
    let Some(label) = &edge.label else {
        return;
    };
    if edge.waypoints.is_empty() {
        return;
    }
    let mid = edge.waypoints[edge.waypoints.len() / 2];
    let row = if mid.y > 0 { mid.y - 1 } else { mid.y + 1 };
    canvas.put_string(mid.x, row, label);
}

/// Phase 6: overwrite the border cell where the edge departs with a stub.
/// The stub's arms deliberately exclude the border direction, so it reads
/// ┬/┴/├/┤ and never ┼.
fn paint_stub(canvas: &mut Canvas, edge: &RoutedEdge) {
    if edge.waypoints.len() < 2 {
        return;
    }
    let bc = BoxChars::for_charset(canvas.charset);
    let first = edge.waypoints[0];
    let glyph = match unit_step(first, edge.waypoints[1]) {
        (0, 1) => bc.tee_down,
        (0, -1) => bc.tee_up,
        (1, 0) => bc.tee_right,
        _ => bc.tee_left,
    };
    canvas.set(first.x, first.y, glyph);
}

// ─── Direction transforms ────────────────────────────────────────────────────

fn remap_vertical(c: char) -> char {
    match c {
        '▼' => '▲',
        '▲' => '▼',
        'v' => '^',
        '^' => 'v',
        '┌' => '└',
        '└' => '┌',
        '┐' => '┘',
        '┘' => '┐',
        '╭' => '╰',
        '╰' => '╭',
        '╮' => '╯',
        '╯' => '╮',
        '┬' => '┴',
        '┴' => '┬',
        '╔' => '╚',
        '╚' => '╔',
        '╗' => '╝',
        '╝' => '╗',
        '╦' => '╩',
        '╩' => '╦',
        other => other,
    }
}

fn remap_horizontal(c: char) -> char {
    match c {
        '►' => '◄',
        '◄' => '►',
        '>' => '<',
        '<' => '>',
        '┌' => '┐',
        '┐' => '┌',
        '└' => '┘',
        '┘' => '└',
        '╭' => '╮',
        '╮' => '╭',
        '╰' => '╯',
        '╯' => '╰',
        '├' => '┤',
        '┤' => '├',
        '╔' => '╗',
        '╗' => '╔',
        '╚' => '╝',
        '╝' => '╚',
        '╠' => '╣',
        '╣' => '╠',
        other => other,
    }
}

fn flip_vertical(s: &str) -> String {
    let flipped: Vec<String> = s
        .lines()
        .rev()
        .map(|line| line.chars().map(remap_vertical).collect())
        .collect();
    let mut out = flipped.join("\n");
    out.push('\n');
    out
}

fn flip_horizontal(s: &str) -> String {
    let lines: Vec<&str> = s.lines().collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let flipped: Vec<String> = lines
        .iter()
        .map(|line| {
            let mut chars: Vec<char> = line.chars().collect();
            chars.resize(width, ' ');
            chars.reverse();
            let remapped: String = chars.into_iter().map(remap_horizontal).collect();
            remapped.trim_end().to_string()
        })
        .collect();
    let mut out = flipped.join("\n");
    out.push('\n');
    out
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Renders a LayoutResult to Unicode or ASCII text.
pub struct TextRenderer {
    pub ascii: bool,
}

impl TextRenderer {
    pub fn new(ascii: bool) -> Self {
        Self { ascii }
    }
}

impl Renderer for TextRenderer {
    fn render(&self, layout: &LayoutResult) -> String {
        let cs = if self.ascii {
            CharSet::Ascii
        } else {
            CharSet::Unicode
        };

        let mut nodes = layout.nodes.clone();
        let mut edges = layout.edges.clone();
        if layout.direction.is_horizontal() {
            transpose_layout(&mut nodes, &mut edges);
        }

        let mut canvas = Canvas::new(cs);

        for node in nodes.iter().filter(|n| n.is_compound()) {
            let sg_id = &node.id[crate::layout::types::COMPOUND_PREFIX.len()..];
            let description = layout.subgraph_descriptions.get(sg_id).map(String::as_str);
            paint_subgraph_box(&mut canvas, node, sg_id, description);
        }

        for node in nodes.iter().filter(|n| !n.is_dummy() && !n.is_compound()) {
            paint_node(&mut canvas, node);
        }

        for edge in &edges {
            paint_edge_lines(&mut canvas, edge);
        }
        for edge in &edges {
            paint_arrowheads(&mut canvas, edge);
            paint_edge_label(&mut canvas, edge);
        }
        for edge in &edges {
            paint_stub(&mut canvas, edge);
        }

        let text = canvas.to_text();
        match layout.direction {
            Direction::BT => flip_vertical(&text),
            Direction::RL => flip_horizontal(&text),
            _ => text,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

//! Canvas — a dynamically sized 2D character grid with merge-aware writes.
//!
//! Cells remember whether they hold a line (family + arms) or an opaque
//! glyph, so repeated line painting merges junctions without information
//! loss. Negative coordinates are silently ignored; the grid grows to fit
//! the largest painted coordinate.

use std::fmt;

use super::charset::{decode_glyph, glyph_for, Arms, BoxChars, CharSet, LineFamily};

// ─── Rect ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

// ─── Cells ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Glyph(char),
    Line { family: LineFamily, arms: Arms },
}

impl Cell {
    fn render(self, cs: CharSet) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Glyph(c) => c,
            Cell::Line { family, arms } => glyph_for(family, arms, cs),
        }
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────────

pub struct Canvas {
    pub charset: CharSet,
    rows: Vec<Vec<Cell>>,
}

impl Canvas {
    pub fn new(charset: CharSet) -> Self {
        Self {
            charset,
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    fn cell_mut(&mut self, x: i64, y: i64) -> Option<&mut Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if self.rows.len() <= y {
            self.rows.resize(y + 1, Vec::new());
        }
        let row = &mut self.rows[y];
        if row.len() <= x {
            row.resize(x + 1, Cell::Empty);
        }
        Some(&mut row[x])
    }

    /// The rendered character at (x, y); space outside the painted area.
    pub fn get(&self, x: i64, y: i64) -> char {
        if x < 0 || y < 0 {
            return ' ';
        }
        self.rows
            .get(y as usize)
            .and_then(|r| r.get(x as usize))
            .map(|c| c.render(self.charset))
            .unwrap_or(' ')
    }

    /// Targeted overwrite — no merging. Used for arrowheads and exit stubs.
    pub fn set(&mut self, x: i64, y: i64, ch: char) {
        if let Some(cell) = self.cell_mut(x, y) {
            *cell = Cell::Glyph(ch);
        }
    }

    /// Write a character with junction merging: if both the existing cell
    /// and `ch` are line glyphs of the same family their arms are OR-ed.
    pub fn put(&mut self, x: i64, y: i64, ch: char) {
        match decode_glyph(ch) {
            Some((family, arms)) => self.merge_line(x, y, family, arms),
            None => self.set(x, y, ch),
        }
    }

    /// Merge line arms into a cell. Cross-family writes and writes over
    /// opaque glyphs replace the cell (second write wins).
    pub fn merge_line(&mut self, x: i64, y: i64, family: LineFamily, arms: Arms) {
        let Some(cell) = self.cell_mut(x, y) else {
            return;
        };
        *cell = match *cell {
            Cell::Line {
                family: existing,
                arms: old,
            } if existing == family => Cell::Line {
                family,
                arms: old.merge(arms),
            },
            Cell::Glyph(c) => match decode_glyph(c) {
                Some((existing, old)) if existing == family => Cell::Line {
                    family,
                    arms: old.merge(arms),
                },
                _ => Cell::Line { family, arms },
            },
            _ => Cell::Line { family, arms },
        };
    }

    /// Write a string left-to-right; one cell per scalar code point.
    pub fn put_string(&mut self, x: i64, y: i64, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i64, y, ch);
        }
    }

    /// Paint a box outline. Borders are opaque glyphs; stubs overwrite them
    /// later with a targeted `set`.
    pub fn draw_box(&mut self, rect: Rect, bc: &BoxChars) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let x1 = rect.x + rect.width - 1;
        let y1 = rect.y + rect.height - 1;
        self.set(rect.x, rect.y, bc.top_left);
        self.set(x1, rect.y, bc.top_right);
        self.set(rect.x, y1, bc.bottom_left);
        self.set(x1, y1, bc.bottom_right);
        for x in rect.x + 1..x1 {
            self.set(x, rect.y, bc.horizontal);
            self.set(x, y1, bc.horizontal);
        }
        for y in rect.y + 1..y1 {
            self.set(rect.x, y, bc.vertical);
            self.set(x1, y, bc.vertical);
        }
    }

    /// Render to text: trailing whitespace trimmed per line, trailing empty
    /// lines dropped, exactly one final newline.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.render(self.charset))
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas_renders_a_single_newline() {
        let c = Canvas::new(CharSet::Unicode);
        assert_eq!(c.to_text(), "\n");
    }

    #[test]
    fn grows_to_fit_writes() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.set(4, 2, 'x');
        assert_eq!(c.height(), 3);
        assert_eq!(c.get(4, 2), 'x');
        assert_eq!(c.get(0, 0), ' ');
    }

    #[test]
    fn negative_coordinates_are_ignored() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.set(-1, 0, 'x');
        c.put(0, -2, '─');
        c.put_string(-3, 0, "abc");
        assert_eq!(c.get(0, 0), ' ');
        // put_string clips only the cells left of zero.
        assert_eq!(c.get(-3 + 3, 0), ' ');
    }

    #[test]
    fn put_merges_crossing_lines() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.put(1, 1, '─');
        c.put(1, 1, '│');
        assert_eq!(c.get(1, 1), '┼');
    }

    #[test]
    fn merge_line_keeps_half_arms() {
        let mut c = Canvas::new(CharSet::Unicode);
        // A bend: line arrives from the left, leaves downward.
        c.merge_line(3, 0, LineFamily::Solid, Arms::new(false, false, true, false));
        c.merge_line(3, 0, LineFamily::Solid, Arms::new(false, true, false, false));
        assert_eq!(c.get(3, 0), '┐');
    }

    #[test]
    fn cross_family_write_wins() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.merge_line(0, 0, LineFamily::Solid, Arms::HORIZONTAL);
        c.merge_line(0, 0, LineFamily::Thick, Arms::VERTICAL);
        assert_eq!(c.get(0, 0), '║');
    }

    #[test]
    fn merge_over_border_glyph_same_family() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.set(0, 0, '─'); // box border
        c.merge_line(0, 0, LineFamily::Solid, Arms::VERTICAL);
        assert_eq!(c.get(0, 0), '┼');
    }

    #[test]
    fn ascii_charset_renders_plus_junctions() {
        let mut c = Canvas::new(CharSet::Ascii);
        c.merge_line(0, 0, LineFamily::Solid, Arms::HORIZONTAL);
        c.merge_line(0, 0, LineFamily::Solid, Arms::VERTICAL);
        assert_eq!(c.get(0, 0), '+');
    }

    #[test]
    fn draw_box_outline() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.draw_box(Rect::new(0, 0, 5, 3), &BoxChars::unicode());
        assert_eq!(c.get(0, 0), '┌');
        assert_eq!(c.get(4, 0), '┐');
        assert_eq!(c.get(0, 2), '└');
        assert_eq!(c.get(4, 2), '┘');
        assert_eq!(c.get(2, 0), '─');
        assert_eq!(c.get(0, 1), '│');
        assert_eq!(c.get(2, 1), ' ');
    }

    #[test]
    fn to_text_trims_trailing_whitespace_and_lines() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.put_string(0, 0, "ab");
        c.set(5, 0, ' ');
        c.set(0, 2, ' ');
        assert_eq!(c.to_text(), "ab\n");
    }

    #[test]
    fn put_string_counts_code_points() {
        let mut c = Canvas::new(CharSet::Unicode);
        c.put_string(0, 0, "héllo");
        assert_eq!(c.get(1, 0), 'é');
        assert_eq!(c.get(4, 0), 'o');
    }
}

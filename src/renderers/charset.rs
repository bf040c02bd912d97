//! Character tables and junction merging.
//!
//! Every line glyph is modeled as a 4-bit set of arms plus a line family
//! (solid, dotted, thick). Painting merges arms by OR within a family and
//! looks the result up in the active table; mixing families is undefined
//! and the second write wins.

// ─── CharSet ─────────────────────────────────────────────────────────────────

/// Which glyph table to draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    #[default]
    Unicode,
    Ascii,
}

// ─── Line families ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineFamily {
    Solid,
    Dotted,
    Thick,
}

// ─── Arms ────────────────────────────────────────────────────────────────────

/// Which directions a junction cell connects to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Arms {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Arms {
    pub const fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    pub const HORIZONTAL: Arms = Arms::new(false, false, true, true);
    pub const VERTICAL: Arms = Arms::new(true, true, false, false);

    /// OR-merge with another set of arms.
    pub fn merge(self, other: Self) -> Self {
        Self {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    pub fn is_empty(self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

// ─── Glyph lookup ────────────────────────────────────────────────────────────

/// Render a family + arms combination in the given charset.
pub fn glyph_for(family: LineFamily, arms: Arms, cs: CharSet) -> char {
    if cs == CharSet::Ascii {
        return match (arms.up, arms.down, arms.left, arms.right) {
            (false, false, false, false) => ' ',
            (false, false, _, _) => '-',
            (_, _, false, false) => '|',
            _ => '+',
        };
    }
    match family {
        LineFamily::Solid => solid_glyph(arms),
        LineFamily::Dotted => match (arms.up, arms.down, arms.left, arms.right) {
            (false, false, false, false) => ' ',
            (false, false, _, _) => '╌',
            (_, _, false, false) => '╎',
            // No dotted junction glyphs exist; junctions borrow the solid set.
            _ => solid_glyph(arms),
        },
        LineFamily::Thick => match (arms.up, arms.down, arms.left, arms.right) {
            (false, false, false, false) => ' ',
            (false, false, _, _) => '═',
            (_, _, false, false) => '║',
            (false, true, false, true) => '╔',
            (false, true, true, false) => '╗',
            (true, false, false, true) => '╚',
            (true, false, true, false) => '╝',
            (true, true, false, true) => '╠',
            (true, true, true, false) => '╣',
            (false, true, true, true) => '╦',
            (true, false, true, true) => '╩',
            (true, true, true, true) => '╬',
        },
    }
}

fn solid_glyph(arms: Arms) -> char {
    match (arms.up, arms.down, arms.left, arms.right) {
        (false, false, false, false) => ' ',
        (false, false, _, _) => '─',
        (_, _, false, false) => '│',
        (false, true, false, true) => '┌',
        (false, true, true, false) => '┐',
        (true, false, false, true) => '└',
        (true, false, true, false) => '┘',
        (true, true, false, true) => '├',
        (true, true, true, false) => '┤',
        (false, true, true, true) => '┬',
        (true, false, true, true) => '┴',
        (true, true, true, true) => '┼',
    }
}

/// Decode a character back into its family and arms. Returns None for
/// anything that is not a line glyph (labels, arrowheads, blanks).
pub fn decode_glyph(c: char) -> Option<(LineFamily, Arms)> {
    let (family, arms) = match c {
        '─' | '-' => (LineFamily::Solid, Arms::HORIZONTAL),
        '│' | '|' => (LineFamily::Solid, Arms::VERTICAL),
        '┌' => (LineFamily::Solid, Arms::new(false, true, false, true)),
        '┐' => (LineFamily::Solid, Arms::new(false, true, true, false)),
        '└' => (LineFamily::Solid, Arms::new(true, false, false, true)),
        '┘' => (LineFamily::Solid, Arms::new(true, false, true, false)),
        '├' => (LineFamily::Solid, Arms::new(true, true, false, true)),
        '┤' => (LineFamily::Solid, Arms::new(true, true, true, false)),
        '┬' => (LineFamily::Solid, Arms::new(false, true, true, true)),
        '┴' => (LineFamily::Solid, Arms::new(true, false, true, true)),
        '┼' | '+' => (LineFamily::Solid, Arms::new(true, true, true, true)),
        '╌' => (LineFamily::Dotted, Arms::HORIZONTAL),
        '╎' => (LineFamily::Dotted, Arms::VERTICAL),
        '═' => (LineFamily::Thick, Arms::HORIZONTAL),
        '║' => (LineFamily::Thick, Arms::VERTICAL),
        '╔' => (LineFamily::Thick, Arms::new(false, true, false, true)),
        '╗' => (LineFamily::Thick, Arms::new(false, true, true, false)),
        '╚' => (LineFamily::Thick, Arms::new(true, false, false, true)),
        '╝' => (LineFamily::Thick, Arms::new(true, false, true, false)),
        '╠' => (LineFamily::Thick, Arms::new(true, true, false, true)),
        '╣' => (LineFamily::Thick, Arms::new(true, true, true, false)),
        '╦' => (LineFamily::Thick, Arms::new(false, true, true, true)),
        '╩' => (LineFamily::Thick, Arms::new(true, false, true, true)),
        '╬' => (LineFamily::Thick, Arms::new(true, true, true, true)),
        _ => return None,
    };
    Some((family, arms))
}

// ─── BoxChars ────────────────────────────────────────────────────────────────

/// Border and marker glyphs for box painting.
#[derive(Debug, Clone)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub tee_right: char, // ├
    pub tee_left: char,  // ┤
    pub tee_down: char,  // ┬
    pub tee_up: char,    // ┴
    pub arrow_right: char,
    pub arrow_left: char,
    pub arrow_down: char,
    pub arrow_up: char,
}

impl BoxChars {
    pub fn unicode() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
            tee_right: '├',
            tee_left: '┤',
            tee_down: '┬',
            tee_up: '┴',
            arrow_right: '►',
            arrow_left: '◄',
            arrow_down: '▼',
            arrow_up: '▲',
        }
    }

    pub fn ascii() -> Self {
        Self {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
            tee_right: '+',
            tee_left: '+',
            tee_down: '+',
            tee_up: '+',
            arrow_right: '>',
            arrow_left: '<',
            arrow_down: 'v',
            arrow_up: '^',
        }
    }

    pub fn for_charset(cs: CharSet) -> Self {
        match cs {
            CharSet::Unicode => Self::unicode(),
            CharSet::Ascii => Self::ascii(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_bitwise_or() {
        let corner = Arms::new(true, false, false, true);
        let other = Arms::new(false, true, true, false);
        assert_eq!(corner.merge(other), Arms::new(true, true, true, true));
        assert!(Arms::default().is_empty());
    }

    #[test]
    fn horizontal_plus_vertical_is_a_cross() {
        let merged = Arms::HORIZONTAL.merge(Arms::VERTICAL);
        assert_eq!(glyph_for(LineFamily::Solid, merged, CharSet::Unicode), '┼');
        assert_eq!(glyph_for(LineFamily::Solid, merged, CharSet::Ascii), '+');
    }

    #[test]
    fn corner_plus_vertical_is_a_tee() {
        let (_, corner) = decode_glyph('┌').unwrap();
        let merged = corner.merge(Arms::VERTICAL);
        assert_eq!(glyph_for(LineFamily::Solid, merged, CharSet::Unicode), '├');
    }

    #[test]
    fn horizontal_absorbs_horizontal() {
        let merged = Arms::HORIZONTAL.merge(Arms::HORIZONTAL);
        assert_eq!(glyph_for(LineFamily::Solid, merged, CharSet::Unicode), '─');
    }

    #[test]
    fn families_have_their_own_lines() {
        assert_eq!(
            glyph_for(LineFamily::Dotted, Arms::HORIZONTAL, CharSet::Unicode),
            '╌'
        );
        assert_eq!(
            glyph_for(LineFamily::Thick, Arms::VERTICAL, CharSet::Unicode),
            '║'
        );
        assert_eq!(
            glyph_for(LineFamily::Thick, Arms::HORIZONTAL.merge(Arms::VERTICAL), CharSet::Unicode),
            '╬'
        );
    }

    #[test]
    fn single_arms_fall_back_to_plain_lines() {
        assert_eq!(
            glyph_for(LineFamily::Solid, Arms::new(true, false, false, false), CharSet::Unicode),
            '│'
        );
        assert_eq!(
            glyph_for(LineFamily::Solid, Arms::new(false, false, false, true), CharSet::Unicode),
            '─'
        );
    }

    #[test]
    fn decode_round_trips_solid_glyphs() {
        for c in ['─', '│', '┌', '┐', '└', '┘', '├', '┤', '┬', '┴', '┼'] {
            let (family, arms) = decode_glyph(c).unwrap();
            assert_eq!(family, LineFamily::Solid);
            assert_eq!(glyph_for(family, arms, CharSet::Unicode), c);
        }
    }

    #[test]
    fn decode_rejects_non_line_chars() {
        assert!(decode_glyph('X').is_none());
        assert!(decode_glyph(' ').is_none());
        assert!(decode_glyph('▼').is_none());
    }

    #[test]
    fn boxchars_tables() {
        let bc = BoxChars::unicode();
        assert_eq!(bc.top_left, '┌');
        assert_eq!(bc.arrow_down, '▼');
        let bc = BoxChars::ascii();
        assert_eq!(bc.top_left, '+');
        assert_eq!(bc.arrow_down, 'v');
    }
}

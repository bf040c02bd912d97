//! Parser trait and the shared low-level `Scanner`.
//!
//! The scanner owns cursor movement, whitespace/comment skipping, and token
//! matching. Statement-level grammar lives in the per-diagram parsers.

use crate::error::ParseError;
use crate::syntax::types::{Direction, EdgeType, Graph};

// ─── Parser trait ────────────────────────────────────────────────────────────

/// One diagram dialect (flowchart today; others would slot in beside it).
pub trait Parser {
    fn parse(&self, src: &str) -> Result<Graph, ParseError>;
}

// ─── Edge connector tokens ───────────────────────────────────────────────────

/// Connector tokens in longest-match-first order.
pub const EDGE_PATTERNS: &[(&str, EdgeType)] = &[
    ("<-.->", EdgeType::BidirDotted),
    ("<==>", EdgeType::BidirThick),
    ("<-->", EdgeType::BidirArrow),
    ("-.->", EdgeType::DottedArrow),
    ("==>", EdgeType::ThickArrow),
    ("-->", EdgeType::Arrow),
    ("-.-", EdgeType::DottedLine),
    ("===", EdgeType::ThickLine),
    ("---", EdgeType::Line),
];

// ─── Scanner ─────────────────────────────────────────────────────────────────

/// Character cursor over the source text.
pub struct Scanner {
    src: Vec<char>,
    pos: usize,
}

impl Scanner {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// 1-based line number of the current position, for error messages.
    pub fn line(&self) -> usize {
        self.src[..self.pos.min(self.src.len())]
            .iter()
            .filter(|&&c| c == '\n')
            .count()
            + 1
    }

    /// A short excerpt of what comes next, for error messages.
    pub fn snippet(&self) -> String {
        self.src[self.pos..]
            .iter()
            .take_while(|&&c| c != '\n' && c != '\r')
            .take(24)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    /// True when the next characters match `s` exactly.
    pub fn peek(&self, s: &str) -> bool {
        let chars: Vec<char> = s.chars().collect();
        self.src.len() >= self.pos + chars.len()
            && self.src[self.pos..self.pos + chars.len()] == chars[..]
    }

    /// Consume `s` if it matches. Returns true if consumed.
    pub fn consume(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// Skip spaces, tabs, and `%% ...` comments, staying on the current line.
    pub fn skip_inline_ws(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ') | Some('\t') => self.pos += 1,
                _ if self.peek("%%") => {
                    while !self.eof() && self.src[self.pos] != '\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip whitespace, comments, and newlines.
    pub fn skip_blank(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => self.pos += 1,
                _ if self.peek("%%") => {
                    while !self.eof() && self.src[self.pos] != '\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Consume one newline (`\r\n`, `\n`, or `\r`).
    pub fn consume_newline(&mut self) -> bool {
        match self.peek_char() {
            Some('\r') => {
                self.pos += 1;
                if self.peek_char() == Some('\n') {
                    self.pos += 1;
                }
                true
            }
            Some('\n') => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// True at a newline or end of input (inline whitespace not skipped).
    pub fn at_line_end(&self) -> bool {
        matches!(self.peek_char(), None | Some('\n') | Some('\r'))
    }

    /// Match an identifier: `[a-zA-Z_][a-zA-Z0-9_-]*`.
    pub fn match_identifier(&mut self) -> Option<String> {
        let first = self.peek_char()?;
        if !first.is_ascii_alphabetic() && first != '_' {
            return None;
        }
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(self.src[start..self.pos].iter().collect())
    }

    /// Consume `word` only when it ends at an identifier boundary.
    pub fn match_keyword(&mut self, word: &str) -> bool {
        if !self.peek(word) {
            return false;
        }
        let end = self.pos + word.chars().count();
        if let Some(&c) = self.src.get(end) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                return false;
            }
        }
        self.pos = end;
        true
    }

    /// Match a direction keyword (`TD`, `TB`, `LR`, `RL`, `BT`).
    pub fn match_direction(&mut self) -> Option<Direction> {
        for token in ["TD", "TB", "LR", "RL", "BT"] {
            let saved = self.pos;
            if self.match_keyword(token) {
                match token.parse() {
                    Ok(d) => return Some(d),
                    Err(_) => self.pos = saved,
                }
            }
        }
        None
    }

    /// Try to match an edge connector token.
    pub fn match_connector(&mut self) -> Option<EdgeType> {
        for (token, etype) in EDGE_PATTERNS {
            if self.consume(token) {
                return Some(*etype);
            }
        }
        None
    }

    /// Parse a double-quoted string with `\n`, `\"`, `\\` escapes.
    /// The opening quote must be the current character.
    pub fn quoted_string(&mut self) -> Result<String, ParseError> {
        let line = self.line();
        self.pos += 1; // opening quote
        let mut buf = String::new();
        while let Some(c) = self.peek_char() {
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(buf);
                }
                '\\' => {
                    self.pos += 1;
                    match self.peek_char() {
                        Some('n') => buf.push('\n'),
                        Some('"') => buf.push('"'),
                        Some('\\') => buf.push('\\'),
                        Some(other) => buf.push(other),
                        None => break,
                    }
                    self.pos += 1;
                }
                _ => {
                    buf.push(c);
                    self.pos += 1;
                }
            }
        }
        Err(ParseError::UnterminatedBracket { line, open: '"' })
    }

    /// Collect characters until one of `stops`, a newline, or end of input.
    /// The stop character is not consumed.
    pub fn take_until(&mut self, stops: &[char]) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == '\n' || c == '\r' || stops.contains(&c) {
                break;
            }
            self.pos += 1;
        }
        self.src[start..self.pos].iter().collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_and_peek() {
        let s = Scanner::new("");
        assert!(s.eof());
        let mut s = Scanner::new("-->rest");
        assert!(s.peek("-->"));
        assert!(!s.peek("-.-"));
        assert!(s.consume("-->"));
        assert_eq!(s.snippet(), "rest");
    }

    #[test]
    fn line_numbers_are_one_based() {
        let mut s = Scanner::new("a\nb\nc");
        assert_eq!(s.line(), 1);
        s.consume("a");
        s.consume_newline();
        assert_eq!(s.line(), 2);
    }

    #[test]
    fn skip_inline_ws_stops_at_newline() {
        let mut s = Scanner::new("  \t %% note\nfoo");
        s.skip_inline_ws();
        assert!(s.at_line_end());
    }

    #[test]
    fn skip_blank_crosses_newlines_and_comments() {
        let mut s = Scanner::new("\n  %% c\n\n  foo");
        s.skip_blank();
        assert_eq!(s.snippet(), "foo");
    }

    #[test]
    fn identifier_allows_dash_and_underscore() {
        let mut s = Scanner::new("my-node_2 rest");
        assert_eq!(s.match_identifier().as_deref(), Some("my-node_2"));
    }

    #[test]
    fn keyword_respects_boundary() {
        let mut s = Scanner::new("endgame");
        assert!(!s.match_keyword("end"));
        let mut s = Scanner::new("end\n");
        assert!(s.match_keyword("end"));
    }

    #[test]
    fn direction_tokens() {
        let mut s = Scanner::new("TB x");
        assert_eq!(s.match_direction(), Some(Direction::TD));
        let mut s = Scanner::new("RL");
        assert_eq!(s.match_direction(), Some(Direction::RL));
        let mut s = Scanner::new("TDX");
        assert_eq!(s.match_direction(), None);
    }

    #[test]
    fn connectors_prefer_longest_match() {
        let mut s = Scanner::new("<-.->");
        assert_eq!(s.match_connector(), Some(EdgeType::BidirDotted));
        let mut s = Scanner::new("-.-");
        assert_eq!(s.match_connector(), Some(EdgeType::DottedLine));
        let mut s = Scanner::new("-.->");
        assert_eq!(s.match_connector(), Some(EdgeType::DottedArrow));
    }

    #[test]
    fn quoted_string_handles_escapes() {
        let mut s = Scanner::new("\"Hello\\nWorld\\\"!\"");
        assert_eq!(s.quoted_string().unwrap(), "Hello\nWorld\"!");
    }

    #[test]
    fn quoted_string_unterminated_is_an_error() {
        let mut s = Scanner::new("\"oops");
        assert!(matches!(
            s.quoted_string(),
            Err(ParseError::UnterminatedBracket { open: '"', .. })
        ));
    }

    #[test]
    fn take_until_stops_before_closer() {
        let mut s = Scanner::new("Hello World] tail");
        assert_eq!(s.take_until(&[']']), "Hello World");
        assert!(s.peek("]"));
    }
}

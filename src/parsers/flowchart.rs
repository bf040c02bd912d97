//! Recursive descent parser for the Mermaid flowchart/graph dialect.
//!
//! Grammar, roughly:
//!
//! ```text
//! graph      := [header] statement*
//! header     := ("graph" | "flowchart") [direction] EOL
//! statement  := subgraph | edge-stmt | node-stmt
//! subgraph   := "subgraph" title EOL ["direction" dir EOL] statement* "end" EOL
//! edge-stmt  := node-ref (connector ["|" text "|"] node-ref)+ EOL
//! node-ref   := ident [shape-bracket]
//! ```
//!
//! Unknown statement syntax is an error rather than being skipped; an edge
//! that references an undeclared id implicitly declares a bare Rectangle
//! node with label = id (that part happens later, in `GraphIR::from_ast`).

use crate::error::ParseError;
use crate::syntax::types::{Direction, Edge, Graph, Node, NodeShape, Subgraph};
#[cfg(test)]
use crate::syntax::types::EdgeType;

use super::base::{Parser, Scanner};

/// Parser for `graph`/`flowchart` diagrams.
pub struct FlowchartParser;

impl Parser for FlowchartParser {
    fn parse(&self, src: &str) -> Result<Graph, ParseError> {
        let mut s = Scanner::new(src);
        let mut graph = Graph::new();

        if let Some(direction) = parse_header(&mut s)? {
            graph.direction = direction;
        }

        loop {
            s.skip_blank();
            if s.eof() {
                break;
            }
            parse_statement(
                &mut s,
                &mut graph.nodes,
                &mut graph.edges,
                &mut graph.subgraphs,
            )?;
        }

        Ok(graph)
    }
}

// ─── Header ──────────────────────────────────────────────────────────────────

fn parse_header(s: &mut Scanner) -> Result<Option<Direction>, ParseError> {
    s.skip_blank();
    let keyword = if s.match_keyword("flowchart") {
        "flowchart"
    } else if s.match_keyword("graph") {
        "graph"
    } else {
        return Ok(None);
    };

    s.skip_inline_ws();
    if s.at_line_end() {
        s.consume_newline();
        return Ok(Some(Direction::TD));
    }

    let direction = s.match_direction().ok_or_else(|| ParseError::MalformedHeader {
        line: s.line(),
        keyword: keyword.to_string(),
        found: s.snippet(),
    })?;

    s.skip_inline_ws();
    if !s.at_line_end() {
        return Err(ParseError::MalformedHeader {
            line: s.line(),
            keyword: keyword.to_string(),
            found: s.snippet(),
        });
    }
    s.consume_newline();
    Ok(Some(direction))
}

// ─── Statements ──────────────────────────────────────────────────────────────

fn parse_statement(
    s: &mut Scanner,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
    subgraphs: &mut Vec<Subgraph>,
) -> Result<(), ParseError> {
    s.skip_inline_ws();

    if s.match_keyword("subgraph") {
        subgraphs.push(parse_subgraph(s)?);
        return Ok(());
    }

    let Some(source) = parse_node_ref(s)? else {
        return Err(ParseError::UnknownSyntax {
            line: s.line(),
            found: s.snippet(),
        });
    };

    let mut prev_id = source.id.clone();
    upsert_node(nodes, source);

    loop {
        s.skip_inline_ws();
        let Some(edge_type) = s.match_connector() else {
            break;
        };
        let label = parse_edge_label(s)?;
        let Some(target) = parse_node_ref(s)? else {
            return Err(ParseError::UnknownSyntax {
                line: s.line(),
                found: s.snippet(),
            });
        };

        let mut edge = Edge::new(prev_id, target.id.clone(), edge_type);
        edge.label = label;
        edges.push(edge);
        prev_id = target.id.clone();
        upsert_node(nodes, target);
    }

    expect_line_end(s)
}

fn expect_line_end(s: &mut Scanner) -> Result<(), ParseError> {
    s.skip_inline_ws();
    if s.eof() || s.consume_newline() {
        Ok(())
    } else {
        Err(ParseError::UnknownSyntax {
            line: s.line(),
            found: s.snippet(),
        })
    }
}

// ─── Node references ─────────────────────────────────────────────────────────

/// Parse `ident` plus an optional shape bracket. Returns `None` when the
/// cursor is not at an identifier.
fn parse_node_ref(s: &mut Scanner) -> Result<Option<Node>, ParseError> {
    s.skip_inline_ws();
    let Some(id) = s.match_identifier() else {
        return Ok(None);
    };
    match parse_shape_bracket(s)? {
        Some((shape, label)) => Ok(Some(Node::new(id, label, shape))),
        None => Ok(Some(Node::bare(id))),
    }
}

fn parse_shape_bracket(s: &mut Scanner) -> Result<Option<(NodeShape, String)>, ParseError> {
    let line = s.line();
    if s.consume("((") {
        let label = parse_label_text(s, ')')?;
        if !s.consume("))") {
            return Err(ParseError::UnterminatedBracket { line, open: '(' });
        }
        return Ok(Some((NodeShape::Circle, label)));
    }
    if s.peek("(") {
        s.consume("(");
        let label = parse_label_text(s, ')')?;
        if !s.consume(")") {
            return Err(ParseError::UnterminatedBracket { line, open: '(' });
        }
        return Ok(Some((NodeShape::Rounded, label)));
    }
    if s.peek("{") {
        s.consume("{");
        let label = parse_label_text(s, '}')?;
        if !s.consume("}") {
            return Err(ParseError::UnterminatedBracket { line, open: '{' });
        }
        return Ok(Some((NodeShape::Diamond, label)));
    }
    if s.peek("[") {
        s.consume("[");
        let label = parse_label_text(s, ']')?;
        if !s.consume("]") {
            return Err(ParseError::UnterminatedBracket { line, open: '[' });
        }
        return Ok(Some((NodeShape::Rectangle, label)));
    }
    Ok(None)
}

/// Label body inside a shape bracket: quoted, or bare text up to the closer.
fn parse_label_text(s: &mut Scanner, closer: char) -> Result<String, ParseError> {
    s.skip_inline_ws();
    if s.peek_char() == Some('"') {
        return s.quoted_string();
    }
    Ok(s.take_until(&[closer]).trim().to_string())
}

/// Optional `|text|` edge label after a connector.
fn parse_edge_label(s: &mut Scanner) -> Result<Option<String>, ParseError> {
    s.skip_inline_ws();
    if !s.consume("|") {
        return Ok(None);
    }
    let line = s.line();
    let text = s.take_until(&['|']);
    if !s.consume("|") {
        return Err(ParseError::UnterminatedBracket { line, open: '|' });
    }
    Ok(Some(text.trim().to_string()))
}

// ─── Subgraphs ───────────────────────────────────────────────────────────────

fn parse_subgraph(s: &mut Scanner) -> Result<Subgraph, ParseError> {
    let (name, description) = parse_subgraph_title(s)?;
    s.skip_inline_ws();
    s.consume_newline();

    let mut sg = Subgraph::new(name);
    sg.description = description;

    loop {
        s.skip_blank();
        if s.eof() {
            return Err(ParseError::UnclosedSubgraph { name: sg.name });
        }
        if s.match_keyword("end") {
            expect_line_end(s)?;
            return Ok(sg);
        }
        if s.match_keyword("direction") {
            s.skip_inline_ws();
            if let Some(d) = s.match_direction() {
                sg.direction = Some(d);
                expect_line_end(s)?;
                continue;
            }
            return Err(ParseError::UnknownSyntax {
                line: s.line(),
                found: s.snippet(),
            });
        }
        parse_statement(s, &mut sg.nodes, &mut sg.edges, &mut sg.subgraphs)?;
    }
}

/// Subgraph title: quoted text, `id[Title]`, or the rest of the line.
fn parse_subgraph_title(s: &mut Scanner) -> Result<(String, Option<String>), ParseError> {
    s.skip_inline_ws();
    if s.peek_char() == Some('"') {
        return Ok((s.quoted_string()?, None));
    }
    let line = s.line();
    let raw = s.take_until(&[]);
    let raw = raw.trim();
    if let Some(open) = raw.find('[') {
        let name = raw[..open].trim().to_string();
        let rest = &raw[open + 1..];
        let Some(close) = rest.rfind(']') else {
            return Err(ParseError::UnterminatedBracket { line, open: '[' });
        };
        return Ok((name, Some(rest[..close].trim().to_string())));
    }
    Ok((raw.to_string(), None))
}

// ─── Node list maintenance ───────────────────────────────────────────────────

/// First definition wins, except that a shaped declaration may fill in a
/// node previously seen only as a bare reference.
pub(crate) fn upsert_node(nodes: &mut Vec<Node>, node: Node) {
    if let Some(existing) = nodes.iter_mut().find(|n| n.id == node.id) {
        let existing_bare = existing.label == existing.id
            && existing.shape == NodeShape::Rectangle
            && existing.attrs.is_empty();
        let incoming_shaped = node.label != node.id || node.shape != NodeShape::Rectangle;
        if existing_bare && incoming_shaped {
            existing.label = node.label;
            existing.shape = node.shape;
            existing.attrs = node.attrs;
        }
        return;
    }
    nodes.push(node);
}

// ─── Tests ───────────────────────────────────────────────────────────────────

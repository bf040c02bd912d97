//! AST for the Mermaid `graph`/`flowchart` dialect.
//!
//! The parser produces these types; the layout pipeline consumes them once
//! (via `GraphIR::from_ast`) and never looks back.

use std::fmt;
use std::str::FromStr;

// ─── Direction ───────────────────────────────────────────────────────────────

/// Flow direction of the diagram. `TB` in source is an alias for `TD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    LR,
    RL,
    #[default]
    TD,
    BT,
}

impl Direction {
    /// True for the two directions whose main axis is horizontal.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LR | Direction::RL)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LR" => Ok(Direction::LR),
            "RL" => Ok(Direction::RL),
            "TD" | "TB" => Ok(Direction::TD),
            "BT" => Ok(Direction::BT),
            other => Err(format!("unknown direction '{other}'; use LR, RL, TD, or BT")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::LR => "LR",
            Direction::RL => "RL",
            Direction::TD => "TD",
            Direction::BT => "BT",
        };
        f.write_str(s)
    }
}

// ─── NodeShape ───────────────────────────────────────────────────────────────

/// Node shape, selected by the bracket style around the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    #[default]
    Rectangle, // id[Label]
    Rounded, // id(Label)
    Diamond, // id{Label}
    Circle,  // id((Label))
}

// ─── EdgeType ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    Arrow,       // -->
    Line,        // ---
    DottedArrow, // -.->
    DottedLine,  // -.-
    ThickArrow,  // ==>
    ThickLine,   // ===
    BidirArrow,  // <-->
    BidirDotted, // <-.->
    BidirThick,  // <==>
}

impl EdgeType {
    /// True if the edge carries an arrowhead at its target end.
    pub fn has_arrow(self) -> bool {
        !matches!(
            self,
            EdgeType::Line | EdgeType::DottedLine | EdgeType::ThickLine
        )
    }

    /// True if the edge carries arrowheads at both ends.
    pub fn is_bidirectional(self) -> bool {
        matches!(
            self,
            EdgeType::BidirArrow | EdgeType::BidirDotted | EdgeType::BidirThick
        )
    }
}

// ─── Attr ────────────────────────────────────────────────────────────────────

/// A free-form key/value attribute attached to a node or edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub key: String,
    pub value: String,
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Identifier as written in the source (e.g. "A", "my-node").
    pub id: String,
    /// Display label; defaults to the id when no shape bracket is given.
    pub label: String,
    pub shape: NodeShape,
    pub attrs: Vec<Attr>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape,
            attrs: Vec::new(),
        }
    }

    /// A bare reference: label equals the id, default Rectangle shape.
    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        let label = id.clone();
        Self {
            id,
            label,
            shape: NodeShape::Rectangle,
            attrs: Vec::new(),
        }
    }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from_id: String,
    pub to_id: String,
    pub edge_type: EdgeType,
    /// Inline `|text|` label, if any.
    pub label: Option<String>,
    pub attrs: Vec<Attr>,
}

impl Edge {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            edge_type,
            label: None,
            attrs: Vec::new(),
        }
    }
}

// ─── Subgraph ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<Subgraph>,
    /// Title text from the `subgraph id[Title]` form, painted inside the box.
    pub description: Option<String>,
    /// `direction <DIR>` override for this subgraph's interior.
    pub direction: Option<Direction>,
}

impl Subgraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            subgraphs: Vec::new(),
            description: None,
            direction: None,
        }
    }
}

// ─── Graph ───────────────────────────────────────────────────────────────────

/// Top-level parse result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    pub direction: Direction,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<Subgraph>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

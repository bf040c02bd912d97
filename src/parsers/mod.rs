//! Diagram-type detection and parser dispatch.

pub mod base;
pub mod flowchart;

pub use base::Parser;

use crate::error::ParseError;
use crate::syntax::types::Graph;
use flowchart::FlowchartParser;

/// Identify the diagram dialect from the first meaningful line.
///
/// Only flowcharts are supported; anything else still routes to the
/// flowchart parser, which treats a missing header as `graph TD`.
pub fn detect_type(src: &str) -> &'static str {
    for line in src.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if lower.starts_with("flowchart") || lower.starts_with("graph") {
            return "flowchart";
        }
        break;
    }
    "flowchart"
}

/// Parse a Mermaid source string into its AST.
pub fn parse(src: &str) -> Result<Graph, ParseError> {
    match detect_type(src) {
        "flowchart" => FlowchartParser.parse(src),
        other => unreachable!("unsupported diagram type: {other}"),
    }
}

//! Syntax layer: the AST produced by the parsers.

pub mod types;

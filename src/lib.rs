//! flowgrid — compiles Mermaid `graph`/`flowchart` source into a rendered
//! 2D character grid (Unicode box drawing, or ASCII with
//! [`RenderConfig::ascii`]).
//!
//! ```
//! use flowgrid::{render_dsl, RenderConfig};
//!
//! let art = render_dsl("graph TD\n    A --> B\n", &RenderConfig::default()).unwrap();
//! assert!(art.contains('▼'));
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod parsers;
pub mod renderers;
pub mod syntax;

pub use config::RenderConfig;
pub use error::ParseError;

use layout::GraphIR;
use renderers::{Renderer, TextRenderer};

/// Parse a Mermaid flowchart string and render it to text.
///
/// Returns the rendered grid with a trailing newline; an empty graph
/// renders as a single newline. Only parse problems surface as errors —
/// everything past the parser is deterministic and total.
pub fn render_dsl(src: &str, config: &RenderConfig) -> Result<String, ParseError> {
    let mut ast = parsers::parse(src)?;
    if let Some(direction) = config.direction {
        ast.direction = direction;
    }

    let mut gir = GraphIR::from_ast(&ast);
    if gir.node_count() == 0 && gir.subgraphs().is_empty() {
        return Ok("\n".to_string());
    }

    let layout = layout::full_layout(&mut gir, config);
    Ok(TextRenderer::new(config.ascii).render(&layout))
}
